// handlers/pets/mod.rs - Pet handlers
//
// collection.rs: GET/POST /api/pets
// record.rs:     GET/PUT/DELETE /api/pets/:id

pub mod collection;
pub mod record;

pub use collection::get as collection_get;
pub use collection::post as collection_post;

pub use record::delete as record_delete;
pub use record::get as record_get;
pub use record::put as record_put;
