/// Aggregation layer: everything the dashboard shows is computed here from a
/// [`FilteredView`](crate::data::filter::FilteredView).
///
/// Undefined statistics (empty view, constant field) are reported as `None`
/// or as an empty collection, never as `NaN`.
pub mod correlation;
pub mod distribution;
pub mod group;
pub mod insights;
pub mod stats;
pub mod summary;
