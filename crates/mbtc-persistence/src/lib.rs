//! JSON Lines persistence for fetched market data.
//!
//! Every record becomes one line in a `.json` file named after the API,
//! the coin and the capture time. Two backends:
//! - `LocalFileWriter`: appends straight to disk, durable per call
//! - `ObjectStoreWriter`: stages locally, uploads the whole buffer on commit

pub mod destination;
pub mod error;
pub mod factory;
pub mod object_store;
pub mod payload;
pub mod writer;

pub use destination::Destination;
pub use error::{PersistenceError, PersistenceResult};
pub use factory::{StorageBackend, WriterFactory};
pub use object_store::{
    DynObjectStore, HttpObjectStore, InMemoryObjectStore, ObjectStore, ObjectStoreError,
    ObjectStoreWriter, WriterState,
};
pub use payload::Payload;
pub use writer::{DataWriter, LocalFileWriter};
