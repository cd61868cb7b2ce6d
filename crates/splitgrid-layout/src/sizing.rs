// ABOUTME: Sizing directive passed to insert, remove and move operations.
// ABOUTME: Decides where needed space comes from and where freed space goes.

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Sizing {
    /// Share the change across every visible panel
    #[default]
    Distribute,
    /// Keep the panel in sequence but take it out of the layout
    Invisible,
    /// On insert: take half of the panel at this index.
    /// On remove: give the freed space to the panel at this index.
    Split(usize),
    /// On insert: an exact size, taken from the nearest panels with slack.
    /// On remove: freed space goes to the nearest neighbours.
    Size(f64),
}
