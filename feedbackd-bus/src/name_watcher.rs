//! Watches `NameOwnerChanged` on the session bus and cascades an orphaned
//! client's events into cancellation (§3 "Client registration", §9
//! "Cancellation").

use std::cell::RefCell;
use std::rc::Rc;

use feedbackd_core::orchestrator::Orchestrator;
use futures_util::StreamExt;

pub async fn watch(connection: zbus::Connection, orchestrator: Rc<RefCell<Orchestrator>>) -> zbus::Result<()> {
    let dbus_proxy = zbus::fdo::DBusProxy::new(&connection).await?;
    let mut stream = dbus_proxy.receive_name_owner_changed().await?;

    tokio::task::spawn_local(async move {
        while let Some(signal) = stream.next().await {
            let Ok(args) = signal.args() else { continue };
            let new_owner_gone = args.new_owner().is_none();
            if new_owner_gone && args.old_owner().is_some() {
                let name = args.name().to_string();
                log::debug!(target: "orchestrator", "bus name {} vanished, cancelling its events", name);
                orchestrator.borrow_mut().on_client_disconnected(&name);
            }
        }
    });

    Ok(())
}
