use crate::domain::identity::OnboardingLink;
use crate::domain::ports::Navigator;
use crate::domain::route::Route;
use crate::error::Result;
use std::io::Write;
use std::sync::Mutex;
use tracing::info;
use url::Url;

/// Navigator for terminal hosts: a redirect is handed to the user as a line
/// on the writer (stdout by default) instead of a browser navigation.
pub struct ConsoleNavigator<W: Write + Send> {
    app_base_url: Url,
    out: Mutex<W>,
}

impl ConsoleNavigator<std::io::Stdout> {
    pub fn stdout(app_base_url: Url) -> Self {
        Self::new(app_base_url, std::io::stdout())
    }
}

impl<W: Write + Send> ConsoleNavigator<W> {
    pub fn new(app_base_url: Url, out: W) -> Self {
        Self {
            app_base_url,
            out: Mutex::new(out),
        }
    }

    pub fn into_inner(self) -> W {
        match self.out.into_inner() {
            Ok(out) => out,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn emit(&self, line: String) -> Result<()> {
        let mut out = match self.out.lock() {
            Ok(out) => out,
            Err(poisoned) => poisoned.into_inner(),
        };
        writeln!(out, "{}", line)?;
        out.flush()?;
        Ok(())
    }
}

impl<W: Write + Send> Navigator for ConsoleNavigator<W> {
    fn redirect(&self, link: &OnboardingLink) -> Result<()> {
        info!(url = %link.as_str(), "redirecting to hosted onboarding");
        self.emit(format!("Continue onboarding at: {}", link.as_str()))
    }

    fn navigate(&self, route: Route) -> Result<()> {
        let url = route.url(&self.app_base_url, None);
        info!(%route, "navigating");
        self.emit(format!("Navigate to: {}", url))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_console_navigator_writes_lines() {
        let navigator =
            ConsoleNavigator::new(Url::parse("http://localhost:5173").unwrap(), Vec::new());
        let link = OnboardingLink::parse("https://pay.example/onboard/xyz").unwrap();
        navigator.redirect(&link).unwrap();
        navigator.navigate(Route::Registration).unwrap();

        let output = String::from_utf8(navigator.into_inner()).unwrap();
        assert_eq!(
            output,
            "Continue onboarding at: https://pay.example/onboard/xyz\nNavigate to: http://localhost:5173/\n"
        );
    }
}
