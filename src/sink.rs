use embedded_io_async::ErrorType;

/// An async destination for items, such as the strings a
/// [`CharWriter`](crate::CharWriter) encodes.
pub trait Sink<Item>: ErrorType {
    /// Accepts one item. It may stay buffered until [`flush`](Sink::flush).
    async fn send(&mut self, item: Item) -> Result<(), Self::Error>;

    /// Hands every buffered item to the underlying writer and flushes it.
    async fn flush(&mut self) -> Result<(), Self::Error>;

    /// Flushes and stops accepting items.
    async fn close(&mut self) -> Result<(), Self::Error>;
}
