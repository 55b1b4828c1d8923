/// An async source of items, such as the text chunks a
/// [`CharReader`](crate::CharReader) decodes.
pub trait Stream {
    type Item;

    /// Returns the next item, or `None` once the source is exhausted.
    async fn next(&mut self) -> Option<Self::Item>;
}
