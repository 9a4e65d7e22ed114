mod handler;
mod model;

pub use handler::{
    cancel_party, complete_party, create_party, find_by_id, join_party, leave_party,
};
