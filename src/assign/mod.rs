/// Module assignment: the median-centred assigner and the leftover recycler.
///
/// ```text
///   good population ──► assigner (pass 1) ──► packed
///                             │
///                          unused ─┐
///   excluded population ───────────┴──► recycler ──► assigner (pass 2)
///                                                       │
///                                             packed ◄──┴──► leftover
/// ```

pub mod assigner;
pub mod recycler;
