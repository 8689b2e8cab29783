//! Desktop notifications through `notify-send`

use tokio::{process::Command, runtime::Handle};
use tracing::{debug, info, warn};

use crate::timers::{NotificationSurface, Permission, PermissionSurface};

/// Sends reminders to the desktop notification daemon.
///
/// Permission is decided once by [`DesktopNotifier::probe`]: it is granted
/// when desktop notifications are enabled and `notify-send` can be run.
#[derive(Debug, Clone)]
pub struct DesktopNotifier {
    permission: Permission,
}

impl DesktopNotifier {
    /// Check whether desktop notifications can be delivered
    pub async fn probe(enabled: bool) -> Self {
        if !enabled {
            info!("Desktop notifications disabled by configuration");
            return Self::with_permission(Permission::Denied);
        }

        let permission = match check_notify_send_available().await {
            Ok(()) => Permission::Granted,
            Err(e) => {
                warn!("{}", e);
                Permission::Denied
            }
        };
        Self::with_permission(permission)
    }

    pub fn with_permission(permission: Permission) -> Self {
        Self { permission }
    }
}

impl PermissionSurface for DesktopNotifier {
    fn current(&self) -> Permission {
        self.permission
    }

    fn request(&mut self) -> Permission {
        // There is no prompt to show; the probe result stands
        self.permission
    }
}

impl NotificationSurface for DesktopNotifier {
    fn notify(&self, title: &str, body: &str) {
        let Ok(runtime) = Handle::try_current() else {
            warn!("No runtime available to deliver notification: {}", title);
            return;
        };

        let title = title.to_string();
        let body = body.to_string();
        runtime.spawn(async move {
            if let Err(e) = send_desktop_notification(&title, &body).await {
                warn!("Failed to deliver notification '{}': {}", title, e);
            }
        });
    }
}

/// Run `notify-send` for a single notification
pub async fn send_desktop_notification(title: &str, body: &str) -> Result<(), String> {
    debug!("Sending desktop notification: {}", title);

    let output = Command::new("notify-send")
        .args(["--app-name=health-reminders", title, body])
        .output()
        .await
        .map_err(|e| format!("Failed to execute notify-send: {}", e))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(format!("notify-send failed: {}", stderr));
    }

    Ok(())
}

/// Check if notify-send is available on the system
pub async fn check_notify_send_available() -> Result<(), String> {
    Command::new("notify-send")
        .arg("--version")
        .output()
        .await
        .map_err(|_| "notify-send is not available, falling back to in-app toasts".to_string())?;

    info!("notify-send is available");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn disabled_probe_denies_permission() {
        let mut notifier = DesktopNotifier::probe(false).await;
        assert_eq!(notifier.current(), Permission::Denied);
        assert_eq!(notifier.request(), Permission::Denied);
    }
}
