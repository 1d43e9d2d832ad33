//! Shared runtime for driving client futures from synchronous code.

#[cfg(not(target_arch = "wasm32"))]
pub mod native {
    use std::future::Future;
    use std::sync::LazyLock;

    use tokio::runtime::{Builder, Runtime};

    static RUNTIME: LazyLock<Runtime> = LazyLock::new(|| {
        Builder::new_current_thread()
            .enable_all()
            .build()
            .expect("failed to build tokio runtime")
    });

    /// Blocks the current thread on the provided future using a shared Tokio runtime.
    ///
    /// Must not be called from within another Tokio runtime.
    pub fn block_on<F, T>(future: F) -> T
    where
        F: Future<Output = T> + 'static,
        T: 'static,
    {
        RUNTIME.block_on(future)
    }
}

#[cfg(not(target_arch = "wasm32"))]
pub use native::block_on;
