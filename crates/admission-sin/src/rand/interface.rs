/// A trait for random sources that return random integers.
///
/// This abstraction allows you to plug in a real random source or a scripted
/// source in tests, so SIN discriminators can be made reproducible.
///
/// # Example
/// ```
/// use admission_sin::RandSource;
///
/// struct FixedRand;
/// impl RandSource<u64> for FixedRand {
///     fn rand(&self) -> u64 {
///         1234
///     }
/// }
///
/// let rng = FixedRand;
/// assert_eq!(rng.rand(), 1234);
/// ```
pub trait RandSource<T> {
    /// Returns a random integer.
    fn rand(&self) -> T;
}

impl<T, R: RandSource<T> + ?Sized> RandSource<T> for &R {
    fn rand(&self) -> T {
        (**self).rand()
    }
}
