use magpie_ast::{Diagnostic, Severity};
use thiserror::Error;

/// The AST provider reported Error or Fatal diagnostics.
#[derive(Debug, Error)]
#[error("{count} error(s) reported while parsing, no output written")]
pub struct DiagnosticFailure {
    pub count: usize,
}

/// Classify and surface every provider diagnostic, then decide.
///
/// All diagnostics are printed before the abort decision so a failing run
/// always shows the full picture. Warnings never abort; Ignored and Note
/// are only printed in verbose mode.
pub fn validate_diagnostics(
    diagnostics: &[Diagnostic],
    verbose: bool,
) -> Result<(), DiagnosticFailure> {
    let mut count = 0;

    for diagnostic in diagnostics {
        match diagnostic.severity {
            Severity::Ignored | Severity::Note => {
                if verbose {
                    log::info!("{}", diagnostic);
                }
            }
            Severity::Warning => log::warn!("{}", diagnostic),
            Severity::Error | Severity::Fatal => {
                log::error!("{}", diagnostic);
                count += 1;
            }
        }
    }

    if count > 0 {
        Err(DiagnosticFailure { count })
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn warnings_do_not_abort() {
        let diagnostics = vec![
            Diagnostic::new(Severity::Warning, "unused variable"),
            Diagnostic::new(Severity::Note, "expanded from macro"),
        ];
        assert!(validate_diagnostics(&diagnostics, false).is_ok());
    }

    #[test]
    fn any_error_aborts_after_counting_all() {
        let diagnostics = vec![
            Diagnostic::new(Severity::Warning, "something mild"),
            Diagnostic::new(Severity::Error, "expected ';'").at("bad.h", 10, 3),
            Diagnostic::new(Severity::Fatal, "file not found"),
        ];
        let failure = validate_diagnostics(&diagnostics, true).unwrap_err();
        assert_eq!(failure.count, 2);
    }
}
