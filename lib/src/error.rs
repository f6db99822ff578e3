use std::{fmt, io};
use std::panic::Location;
use std::convert::Infallible;
use std::error::Error as StdError;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// A build failure: one or more details, optionally sitting on top of the
/// failure that caused it.
#[derive(Debug)]
pub struct Error {
    details: Vec<Box<dyn ErrorDetail>>,
    cause: Option<Box<Error>>,
    location: &'static Location<'static>,
}

pub trait ErrorDetail: fmt::Display + fmt::Debug + Send + Sync {
    fn context(&self) -> Vec<(Option<String>, String)> { vec![] }
}

impl Error {
    #[track_caller]
    pub fn from_std<E>(error: E) -> Self
        where E: StdError + Send + Sync + 'static
    {
        Error::from(Box::new(error) as Box<dyn StdError + Send + Sync>)
    }

    /// Places `self` beneath `outer`, at the bottom of `outer`'s chain.
    pub fn chain(self, mut outer: Error) -> Self {
        fn bottom(error: &mut Error) -> &mut Error {
            match error.cause {
                Some(ref mut cause) => bottom(cause),
                None => error,
            }
        }

        bottom(&mut outer).cause = Some(Box::new(self));
        outer
    }

    /// The top-level message, without context or causes.
    pub fn message(&self) -> String {
        self.details.iter()
            .map(|d| d.to_string())
            .collect::<Vec<_>>()
            .join("; ")
    }

    pub fn cause(&self) -> Option<&Error> {
        self.cause.as_deref()
    }

    pub fn location(&self) -> &'static Location<'static> {
        self.location
    }
}

impl ErrorDetail for &(dyn StdError + Send + Sync) {
    fn context(&self) -> Vec<(Option<String>, String)> {
        let mut context = vec![];
        let mut source = self.source();
        while let Some(e) = source {
            context.push((None, e.to_string()));
            source = e.source();
        }

        context
    }
}

impl ErrorDetail for Box<dyn StdError + Send + Sync> {
    fn context(&self) -> Vec<(Option<String>, String)> {
        let error: &(dyn StdError + Send + Sync) = &**self;
        error.context()
    }
}

macro_rules! impl_error_detail_with_std_error {
    ($($T:ty),* $(,)?) => {
        $(
            impl $crate::error::ErrorDetail for $T {
                fn context(&self) -> Vec<(Option<String>, String)> {
                    let error: &(dyn std::error::Error + Send + Sync) = self;
                    error.context()
                }
            }
        )*
    }
}

impl_error_detail_with_std_error!(
    io::Error,
    toml::de::Error,
    serde_json::Error,
    regex::Error,
    jwalk::Error,
    tokio::task::JoinError,
);

#[cfg(feature = "http")]
impl_error_detail_with_std_error!(reqwest::Error);

impl ErrorDetail for String { }
impl ErrorDetail for &str { }

impl ErrorDetail for Infallible { }

impl<T: ErrorDetail + 'static> From<T> for Error {
    #[track_caller]
    fn from(detail: T) -> Self {
        Error {
            details: vec![Box::new(detail)],
            cause: None,
            location: Location::caller(),
        }
    }
}

impl Clone for Error {
    fn clone(&self) -> Self {
        Error {
            details: self.details.iter()
                .map(|detail| Detail::from(&**detail))
                .map(|detail| Box::new(detail) as Box<dyn ErrorDetail>)
                .collect(),
            cause: self.cause.clone(),
            location: self.location,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn write_level(f: &mut fmt::Formatter<'_>, error: &Error, depth: usize) -> fmt::Result {
            let indent = " ".repeat(depth * 4);
            let newline = format!("\n{indent}");
            for detail in &error.details {
                writeln!(f, "{indent}{}", detail.to_string().replace('\n', &newline))?;
                for (key, value) in detail.context() {
                    let value = value.replace('\n', &newline);
                    match key {
                        Some(key) => writeln!(f, "{indent}  {key}: {value}")?,
                        None => writeln!(f, "{indent}  {value}")?,
                    }
                }
            }

            if std::env::var_os("RUST_BACKTRACE").is_some() {
                writeln!(f, "{indent}  [{}]", error.location)?;
            }

            match &error.cause {
                Some(cause) => write_level(f, cause, depth + 1),
                None => Ok(()),
            }
        }

        write_level(f, self, 0)
    }
}

/// A detail built from a message and its parameters.
#[derive(Debug)]
pub struct Detail {
    pub message: String,
    pub parameters: Vec<(Option<String>, String)>,
}

impl From<&dyn ErrorDetail> for Detail {
    #[inline]
    fn from(detail: &dyn ErrorDetail) -> Self {
        Detail {
            message: detail.to_string(),
            parameters: detail.context(),
        }
    }
}

impl fmt::Display for Detail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.message.fmt(f)
    }
}

impl ErrorDetail for Detail {
    fn context(&self) -> Vec<(Option<String>, String)> {
        self.parameters.clone()
    }
}

#[doc(hidden)]
#[macro_export]
macro_rules! err {
    ($($token:tt)*) => (Err($crate::error!($($token)*)));
}

/// Builds an [`Error`](crate::error::Error) from a message followed by
/// `"key" => value` parameters and bare values.
#[doc(hidden)]
#[macro_export]
macro_rules! error {
    (@param $v:ident $key:expr => $value:expr, $($rest:tt)*) => {
        $crate::error!(@param $v $key => $value);
        $crate::error!(@param $v $($rest)*);
    };

    (@param $v:ident $key:expr => $value:expr) => {
        $v.push((Some($key.to_string()), $value.to_string()));
    };

    (@param $v:ident $value:expr, $($rest:tt)*) => {
        $crate::error!(@param $v $value);
        $crate::error!(@param $v $($rest)*);
    };

    (@param $v:ident $value:expr) => {
        $v.push((None, $value.to_string()));
    };

    (@param $v:ident $(,)?) => { };

    ($msg:expr, $($rest:tt)*) => (
        $crate::error::Error::from($crate::error::Detail {
            message: $msg.to_string(),
            parameters: {
                #[allow(unused_mut)]
                let mut v: Vec<(Option<String>, String)> = Vec::new();
                $crate::error!(@param v $($rest)*);
                v
            },
        })
    );

    ($msg:expr) => ($crate::error!($msg,));
}

pub trait Chainable<T> {
    fn chain(self, outer: impl Into<Error>) -> Result<T>;

    fn chain_with<F, E>(self, f: F) -> Result<T>
        where F: FnOnce() -> E, E: Into<Error>;
}

impl<T, E: Into<Error>> Chainable<T> for Result<T, E> {
    #[track_caller]
    fn chain(self, outer: impl Into<Error>) -> Result<T> {
        self.map_err(|e| e.into().chain(outer.into()))
    }

    #[track_caller]
    fn chain_with<F, Outer>(self, f: F) -> Result<T>
        where F: FnOnce() -> Outer, Outer: Into<Error>,
    {
        self.map_err(|e| e.into().chain(f().into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chained_errors_render_as_a_tree() {
        let io = io::Error::new(io::ErrorKind::NotFound, "no such file");
        let result: Result<()> = Err(io).chain(crate::error! {
            "failed to read anchor",
            "path" => "docs/anchors/tdd.adoc",
        });

        let error = result.unwrap_err();
        assert_eq!(error.message(), "failed to read anchor");
        assert_eq!(error.cause().unwrap().message(), "no such file");

        let rendered = error.to_string();
        assert!(rendered.starts_with("failed to read anchor\n"));
        assert!(rendered.contains("  path: docs/anchors/tdd.adoc\n"));
        assert!(rendered.contains("    no such file\n"));
    }

    #[test]
    fn chain_appends_beneath_existing_causes() {
        let inner = Error::from("inner");
        let middle = crate::error!("middle");
        let outer = crate::error!("outer");

        let error = inner.chain(middle).chain(outer);
        assert_eq!(error.message(), "outer");
        assert_eq!(error.cause().unwrap().message(), "middle");
        assert_eq!(error.cause().unwrap().cause().unwrap().message(), "inner");
    }

    #[test]
    fn clone_preserves_context() {
        let error = crate::error!("bad entry", "id" => "x", "missing roles");
        let cloned = error.clone();
        assert_eq!(error.to_string(), cloned.to_string());
    }
}
