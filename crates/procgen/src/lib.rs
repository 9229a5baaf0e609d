//! Procedural generation for planets, their terrain and biomes, and tree grammars.

pub mod asset;
pub mod biome;
pub mod grammar;
pub mod icosphere;
pub mod lsystem;
pub mod planet;
pub mod solar_system;
pub mod terrain;

pub use asset::*;
pub use biome::*;
pub use grammar::*;
pub use icosphere::*;
pub use lsystem::*;
pub use planet::*;
pub use solar_system::*;
pub use terrain::*;
