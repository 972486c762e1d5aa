//! Process exit codes.
//!
//! `0` and `1` are reserved for the boolean answers of `read --status`,
//! `write --check` and `reset --verify`.

use fanuc_webctl::{ErrorKind, WebCtlError};

/// Exit code: invalid command-line or configuration input.
pub const EXIT_USAGE: u8 = 2;
/// Exit code: controller could not be reached.
pub const EXIT_CONNECTIVITY: u8 = 3;
/// Exit code: credentials missing or rejected.
pub const EXIT_AUTH: u8 = 4;
/// Exit code: unexpected status or unparseable response.
pub const EXIT_PROTOCOL: u8 = 5;
/// Exit code: controller refused the request.
pub const EXIT_DOMAIN: u8 = 6;
/// Exit code: unexpected/internal failure.
pub const EXIT_INTERNAL: u8 = 20;

#[must_use]
pub fn code_for_kind(kind: ErrorKind) -> u8 {
    match kind {
        ErrorKind::Usage => EXIT_USAGE,
        ErrorKind::Connectivity => EXIT_CONNECTIVITY,
        ErrorKind::Authentication => EXIT_AUTH,
        ErrorKind::Protocol => EXIT_PROTOCOL,
        ErrorKind::Domain => EXIT_DOMAIN,
    }
}

/// Map a command failure to a stable exit code.
#[must_use]
pub fn classify_error(err: &anyhow::Error) -> u8 {
    err.chain()
        .find_map(|cause| cause.downcast_ref::<WebCtlError>())
        .map_or(EXIT_INTERNAL, |err| code_for_kind(err.kind()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;
    use fanuc_webctl::error::Resource;

    #[test]
    fn classify_library_errors_by_kind() {
        let usage = anyhow::Error::new(WebCtlError::InvalidArgument("bad port".into()));
        assert_eq!(classify_error(&usage), EXIT_USAGE);

        let auth = anyhow::Error::new(WebCtlError::Authentication(Resource::Kcl));
        assert_eq!(classify_error(&auth), EXIT_AUTH);

        let domain = anyhow::Error::new(WebCtlError::Controller("not started".into()));
        assert_eq!(classify_error(&domain), EXIT_DOMAIN);
    }

    #[test]
    fn classify_looks_through_context() {
        let err = Err::<(), _>(WebCtlError::Connection("refused".into()))
            .context("reading $NUMREG[1]")
            .unwrap_err();
        assert_eq!(classify_error(&err), EXIT_CONNECTIVITY);
    }

    #[test]
    fn classify_other_errors_as_internal() {
        assert_eq!(classify_error(&anyhow::anyhow!("boom")), EXIT_INTERNAL);
    }
}
