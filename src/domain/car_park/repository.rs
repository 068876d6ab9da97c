//! Read access to the car park table

use super::model::CarParkRecord;

/// Source of car park records for one request.
///
/// The table behind it is owned and mutated by the ingestion side;
/// implementations must hand out an owned snapshot rather than a view
/// into live state.
pub trait CarParkSource: Send + Sync {
    fn snapshot(&self) -> Vec<CarParkRecord>;
}
