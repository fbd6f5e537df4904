//! Plain-text problem inputs and run outputs.

pub mod readers;
pub mod writers;

pub use readers::{
    read_obstacles, read_obstacles_or_default, read_states, read_vehicle, read_vehicle_or_default,
};
pub use writers::{write_edges, write_nodes, write_path, write_run_outputs, write_search_tree};

pub const DEFAULT_STATES_FILE: &str = "states.txt";
pub const DEFAULT_OBSTACLES_FILE: &str = "obstacles.txt";
pub const DEFAULT_VEHICLE_FILE: &str = "robot.txt";
