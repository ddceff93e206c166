//! Driving futures from synchronous code.
//! **Note**: with the `tokio` feature (default) this is a fresh current-thread
//! tokio runtime per call; without it, the `futures` executor is used.
//! Both run the future on the calling thread, so it does not need to be `Send`.

pub use impls::block_on;

#[cfg(feature = "tokio")]
mod impls {
    use std::future::Future;

    use crate::error::Error;

    pub fn block_on<F: Future>(f: F) -> crate::Result<F::Output> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(Error::propagated)?;
        Ok(runtime.block_on(f))
    }
}

#[cfg(not(feature = "tokio"))]
mod impls {
    use std::future::Future;

    pub fn block_on<F: Future>(f: F) -> crate::Result<F::Output> {
        Ok(futures::executor::block_on(f))
    }
}
