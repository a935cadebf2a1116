/*!
 * Caption timeline.
 *
 * - `list`: the timeline itself, loading and lookups
 * - `editing`: mutations, gap-fitting insertion, split and shift
 * - `changes`: change records and batched listener delivery
 */

pub mod changes;
pub mod editing;
pub mod list;

pub use changes::{Change, ChangeListener, ListenerId};
pub use list::CaptionTimeline;
