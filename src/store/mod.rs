pub mod archive;

pub use archive::{
    Archive, EntityKind, EntitySet, FieldOutput, FieldValue, Frame, Instance, Step,
};
