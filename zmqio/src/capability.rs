//! libzmq build information.

use zmqio_core::error::{Errno, Error, Result};

/// Version of the linked libzmq as `(major, minor, patch)`.
#[must_use]
pub fn version() -> (i32, i32, i32) {
    zmq::version()
}

/// Whether libzmq was built with `capability` (`"curve"`, `"ipc"`,
/// `"draft"`, ...). `None` if libzmq cannot tell.
#[must_use]
pub fn has(capability: &str) -> Option<bool> {
    zmq::has(capability)
}

/// A CURVE key pair, both keys Z85-encoded (40 characters).
#[derive(Clone, PartialEq, Eq)]
pub struct CurveKeyPair {
    pub public_key: String,
    pub secret_key: String,
}

impl std::fmt::Debug for CurveKeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CurveKeyPair")
            .field("public_key", &self.public_key)
            .finish_non_exhaustive()
    }
}

/// Generates a CURVE key pair.
///
/// # Errors
///
/// `ENOTSUP` if libzmq was built without CURVE support.
pub fn curve_key_pair() -> Result<CurveKeyPair> {
    let pair = zmq::CurveKeyPair::new().map_err(|err| Error::native(Errno(err.to_raw())))?;
    let encode = |key: &[u8]| {
        zmq::z85_encode(key).map_err(|err| Error::argument(format!("Z85 encoding failed: {err}")))
    };
    Ok(CurveKeyPair {
        public_key: encode(&pair.public_key)?,
        secret_key: encode(&pair.secret_key)?,
    })
}
