use std::io::Write;

use log::{info, warn};

/// A trait, necessary for every entity that shows blocking messages to the customer.
pub trait Notifier {
    fn alert(&self, message: &str);
}

/// Prints alerts to stdout.
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn alert(&self, message: &str) {
        info!("Alerting customer: {}", message);
        if let Err(err) = print_alert(&mut std::io::stdout(), message) {
            warn!("Failed to show alert {:?}: {}", message, err);
        }
    }
}

fn print_alert<W: Write>(output: &mut W, message: &str) -> std::io::Result<()> {
    writeln!(output, "!! {}", message)?;
    output.flush()
}

#[cfg(test)]
mod tests {
    use super::*;

    struct BrokenPipe;

    impl Write for BrokenPipe {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Err(std::io::ErrorKind::BrokenPipe.into())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn print_alert_writes_marked_line() {
        let mut output = Vec::new();
        print_alert(&mut output, "Failed to place order.").unwrap();
        assert_eq!(String::from_utf8(output).unwrap(), "!! Failed to place order.\n");
    }

    #[test]
    fn print_alert_reports_write_errors() {
        let err = print_alert(&mut BrokenPipe, "hello").unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::BrokenPipe);
    }
}
