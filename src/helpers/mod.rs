pub mod extreme_points;
pub mod hyperplane;
pub mod hypervolume;
pub mod linalg;
