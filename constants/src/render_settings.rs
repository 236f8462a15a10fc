// Shared presentation settings for the viewer. Sizes are in normalized
// scene units (models are scaled so their largest dimension is 10).

pub const MARKER_SPHERE_SIZE: f32 = 0.05;
pub const MEASURE_LINE_WIDTH: f32 = 0.03;

pub const GRID_CELL_COUNT: u32 = 20;
pub const GRID_CELL_SIZE: f32 = 1.0;
pub const GRID_Y_OFFSET: f32 = -0.01;
pub const AXIS_LENGTH: f32 = 5.0;
