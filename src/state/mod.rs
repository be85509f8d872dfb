pub mod aggregate;
pub mod cell_content;
pub mod cell_input;
pub mod coerce;
pub mod command;
pub mod data_model;
pub mod display_name;
pub mod factory;
pub mod journal;
pub mod table_state;
pub mod view;
