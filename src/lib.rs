//! Tile-layer layout optimizer: rearranges the columns of a Tiled map layer so that
//! neighbouring columns have similar heights.

pub mod cli;
pub mod convert;
pub mod layer;
pub mod optimizer;
pub mod parallel;
pub mod rng;
pub mod tmx;
