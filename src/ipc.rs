//! Request/response messages exchanged with the process that owns native
//! menus and dialogs.
//!
//! This crate does not show menus or dialogs itself. A front-end receives the
//! requests from a [`RequestReceiver`] and answers each one exactly once.

use crate::error::GitError;
use crate::types::Result;
use std::fmt::{self, Display, Formatter};
use std::path::PathBuf;
use tokio::sync::{mpsc, oneshot, Mutex};
use tracing::debug;

/// The fixed set of channels requests travel over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum IpcChannel {
    ContextMenu,
    WindowMenu,
    SystemDialog,
}

impl IpcChannel {
    pub fn as_str(&self) -> &'static str {
        match self {
            IpcChannel::ContextMenu => "context-menu",
            IpcChannel::WindowMenu => "window-menu",
            IpcChannel::SystemDialog => "system-dialog",
        }
    }
}

impl Display for IpcChannel {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The kind of paths an open dialog lets the user select.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum OpenDialogPathKind {
    #[cfg_attr(feature = "serde", serde(rename = "file"))]
    File,
    #[cfg_attr(feature = "serde", serde(rename = "dir"))]
    Directory,
    #[cfg_attr(feature = "serde", serde(rename = "any"))]
    Any,
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ShowOpenDialogRequest {
    /// If `true` the dialog is owned by the window the request came from.
    pub is_owned: bool,
    /// Title of the dialog, e.g. `Open File`.
    pub title: Option<String>,
    pub default_path: Option<PathBuf>,
    pub path_kind: OpenDialogPathKind,
}

impl ShowOpenDialogRequest {
    pub fn new(path_kind: OpenDialogPathKind) -> ShowOpenDialogRequest {
        ShowOpenDialogRequest {
            is_owned: false,
            title: None,
            default_path: None,
            path_kind,
        }
    }
}

/// The selected paths; empty if the dialog was cancelled.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ShowOpenDialogResponse {
    pub paths: Vec<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum MenuItemType {
    Normal,
    Checkbox,
    Separator,
    Submenu,
}

/// One entry of a serialized menu.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MenuItem {
    pub id: String,
    pub label: Option<String>,
    pub item_type: MenuItemType,
    pub checked: Option<bool>,
    pub submenu: Option<Vec<MenuItem>>,
}

impl MenuItem {
    pub fn normal<I: Into<String>, L: Into<String>>(id: I, label: L) -> MenuItem {
        MenuItem {
            id: id.into(),
            label: Some(label.into()),
            item_type: MenuItemType::Normal,
            checked: None,
            submenu: None,
        }
    }

    pub fn checkbox<I: Into<String>, L: Into<String>>(id: I, label: L, checked: bool) -> MenuItem {
        MenuItem {
            checked: Some(checked),
            item_type: MenuItemType::Checkbox,
            ..MenuItem::normal(id, label)
        }
    }

    pub fn separator<I: Into<String>>(id: I) -> MenuItem {
        MenuItem {
            id: id.into(),
            label: None,
            item_type: MenuItemType::Separator,
            checked: None,
            submenu: None,
        }
    }

    pub fn submenu<I: Into<String>, L: Into<String>>(id: I, label: L, items: Vec<MenuItem>) -> MenuItem {
        MenuItem {
            item_type: MenuItemType::Submenu,
            submenu: Some(items),
            ..MenuItem::normal(id, label)
        }
    }

    /// Finds the item with `id` in this item or its submenus.
    pub fn find(&self, id: &str) -> Option<&MenuItem> {
        if self.id == id {
            return Some(self);
        }
        self.submenu
            .iter()
            .flatten()
            .find_map(|item| item.find(id))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ShowContextMenuRequest {
    pub items: Vec<MenuItem>,
}

/// The context menu item the user activated.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ContextMenuAction {
    pub id: String,
    /// Whether the item is now checked, for checkbox items.
    pub checked: Option<bool>,
}

/// A request waiting for its response.
#[derive(Debug)]
pub struct PendingRequest<Req, Resp> {
    pub request: Req,
    responder: oneshot::Sender<Resp>,
}

impl<Req, Resp> PendingRequest<Req, Resp> {
    /// Sends the response back to the requester. Returns `false` if the
    /// requester stopped waiting.
    pub fn respond(self, response: Resp) -> bool {
        self.responder.send(response).is_ok()
    }
}

/// The sending half of a channel: each request awaits exactly one response.
///
/// Requests on the same relay are serialized so that only one is
/// outstanding at a time.
#[derive(Debug)]
pub struct RequestRelay<Req, Resp> {
    channel: IpcChannel,
    sender: mpsc::Sender<PendingRequest<Req, Resp>>,
    in_flight: Mutex<()>,
}

/// The receiving half of a channel, held by whatever shows menus and dialogs.
#[derive(Debug)]
pub struct RequestReceiver<Req, Resp> {
    channel: IpcChannel,
    receiver: mpsc::Receiver<PendingRequest<Req, Resp>>,
}

/// Creates a connected relay/receiver pair for `channel`.
pub fn relay<Req, Resp>(channel: IpcChannel) -> (RequestRelay<Req, Resp>, RequestReceiver<Req, Resp>) {
    let (sender, receiver) = mpsc::channel(1);
    (
        RequestRelay {
            channel,
            sender,
            in_flight: Mutex::new(()),
        },
        RequestReceiver { channel, receiver },
    )
}

impl<Req, Resp> RequestRelay<Req, Resp> {
    pub fn channel(&self) -> IpcChannel {
        self.channel
    }

    /// Sends `request` and waits for its response.
    ///
    /// # Errors
    /// Returns `GitError::IpcChannelClosed` if the receiver is gone or drops
    /// the request without answering.
    pub async fn request(&self, request: Req) -> Result<Resp> {
        let _outstanding = self.in_flight.lock().await;
        let closed = || GitError::IpcChannelClosed(self.channel.to_string());

        let (responder, response) = oneshot::channel();
        self.sender
            .send(PendingRequest { request, responder })
            .await
            .map_err(|_| closed())?;
        debug!(channel = %self.channel, "sent request");

        response.await.map_err(|_| closed())
    }
}

impl<Req, Resp> RequestReceiver<Req, Resp> {
    pub fn channel(&self) -> IpcChannel {
        self.channel
    }

    /// Waits for the next request; `None` once every relay has been dropped.
    pub async fn recv(&mut self) -> Option<PendingRequest<Req, Resp>> {
        self.receiver.recv().await
    }
}

/// Asks the front-end to show open dialogs.
#[derive(Debug)]
pub struct SystemDialogClient {
    relay: RequestRelay<ShowOpenDialogRequest, ShowOpenDialogResponse>,
}

impl SystemDialogClient {
    pub fn new(relay: RequestRelay<ShowOpenDialogRequest, ShowOpenDialogResponse>) -> SystemDialogClient {
        SystemDialogClient { relay }
    }

    /// Lets the user select a single directory.
    ///
    /// # Returns
    /// The selected directory, or `None` if the user cancelled.
    pub async fn prompt_for_single_directory(&self) -> Result<Option<PathBuf>> {
        let response = self
            .relay
            .request(ShowOpenDialogRequest::new(OpenDialogPathKind::Directory))
            .await?;
        Ok(response.paths.into_iter().next())
    }
}
