// Module exports for pure logic
pub mod navigation;
pub mod downloads;   // Staged downloads and save paths
pub mod tabs;        // Tab strip bookkeeping
pub mod theme;
