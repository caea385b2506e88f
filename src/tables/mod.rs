//! Output tables of the star schema
//!
//! Four dimension tables (songs, artists, users, time) and one fact table
//! (songplays), each with a fixed Arrow schema and partitioning.
//!
//! # Overview
//!
//! - Row types are plain structs produced by the `transform` module
//! - [`Table`] ties a row type to its name, schema and partition columns
//! - [`TableDef`] is the runtime description used by writers and readers

mod schema;
mod types;

pub use schema::{
    all_tables, ArtistsTable, SongplaysTable, SongsTable, Table, TableDef, TimeTable, UsersTable,
};
pub use types::{ArtistRow, SongRow, SongplayRow, TimeRow, UserRow};
