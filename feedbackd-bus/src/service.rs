//! Connects to the session bus, publishes the `Feedback` (and conditional
//! `Haptic`) interfaces, and drives the dispatcher loop: a manually-ticked
//! zbus executor, the completion-queue drain, and the name-owner watcher,
//! all on one `LocalSet` so the non-`Send` device handles never need to
//! cross a thread boundary (§4.9, §5, §9).

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use feedbackd_core::orchestrator::Orchestrator;
use zbus::fdo::RequestNameFlags;

use crate::feedback_iface::{FeedbackIface, BUS_NAME, OBJECT_PATH};
use crate::haptic_iface::HapticIface;
use crate::name_watcher;

/// Run the daemon to completion: connect, publish, serve, until `shutdown`
/// resolves (wired to SIGTERM/SIGINT by the caller).
pub async fn run(
    orchestrator: Rc<RefCell<Orchestrator>>,
    replace: bool,
    shutdown: impl std::future::Future<Output = ()>,
) -> zbus::Result<()> {
    let connection = zbus::connection::Builder::session()?.internal_executor(false).build().await?;

    let has_haptic = orchestrator.borrow().has_haptic();
    let devices = orchestrator.borrow().devices();

    connection
        .object_server()
        .at(OBJECT_PATH, FeedbackIface { orchestrator: orchestrator.clone() })
        .await?;
    if has_haptic {
        connection.object_server().at(OBJECT_PATH, HapticIface::new(devices)).await?;
        log::info!(target: "orchestrator", "vibrator present, publishing Haptic interface");
    } else {
        log::info!(target: "orchestrator", "no vibrator found, Haptic interface not published");
    }

    request_name(&connection, replace).await?;

    // Drives zbus's internal message dispatch now that we opted out of its
    // own executor — required so #[interface] method calls actually fire.
    {
        let connection = connection.clone();
        tokio::task::spawn_local(async move {
            loop {
                connection.executor().tick().await;
            }
        });
    }

    name_watcher::watch(connection.clone(), orchestrator.clone()).await?;

    let drain_task = {
        let connection = connection.clone();
        let orchestrator = orchestrator.clone();
        tokio::task::spawn_local(async move {
            let iface_ref = match connection.object_server().interface::<_, FeedbackIface>(OBJECT_PATH).await {
                Ok(r) => r,
                Err(e) => {
                    log::error!(target: "orchestrator", "could not acquire Feedback interface ref: {}", e);
                    return;
                }
            };
            let mut tick = tokio::time::interval(Duration::from_millis(50));
            loop {
                tick.tick().await;
                let ended = orchestrator.borrow_mut().drain_completions();
                for (id, reason) in ended {
                    let emitter = iface_ref.signal_emitter();
                    if let Err(e) = FeedbackIface::feedback_ended(&emitter, id.get(), reason.as_wire()).await {
                        log::warn!(target: "orchestrator", "failed to emit FeedbackEnded({}): {}", id, e);
                    }
                }
            }
        })
    };

    shutdown.await;
    log::info!(target: "orchestrator", "shutdown signal received, cancelling outstanding events");
    orchestrator.borrow_mut().cancel_all();
    drain_task.abort();
    Ok(())
}

async fn request_name(connection: &zbus::Connection, replace: bool) -> zbus::Result<()> {
    let dbus_proxy = zbus::fdo::DBusProxy::new(connection).await?;
    let mut flags = RequestNameFlags::AllowReplacement.into();
    if replace {
        flags |= RequestNameFlags::ReplaceExisting;
    }
    dbus_proxy.request_name(BUS_NAME.try_into().expect("BUS_NAME is a valid well-known name"), flags).await?;
    Ok(())
}
