use crate::common::remote::FakeConnector;
use crowdin_sync::Collaborators;
use crowdin_sync::areas::branches::VcsBranchProvider;
use crowdin_sync::areas::notifier::HostNotifier;
use parking_lot::Mutex;
use std::path::Path;
use std::sync::Arc;

pub struct FakeVcs(pub String);

impl FakeVcs {
    pub fn on(branch: &str) -> Self {
        Self(branch.to_string())
    }
}

impl VcsBranchProvider for FakeVcs {
    fn current_branch_name(&self, _project_root: &Path) -> String {
        self.0.clone()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    Info(String),
    Error(String),
    Debug(String),
}

#[derive(Default)]
pub struct RecordingNotifier {
    messages: Mutex<Vec<Message>>,
}

impl RecordingNotifier {
    pub fn errors(&self) -> Vec<String> {
        self.messages
            .lock()
            .iter()
            .filter_map(|message| match message {
                Message::Error(text) => Some(text.clone()),
                _ => None,
            })
            .collect()
    }
}

impl HostNotifier for RecordingNotifier {
    fn info(&self, message: &str) {
        self.messages.lock().push(Message::Info(message.to_string()));
    }

    fn error(&self, message: &str) {
        self.messages.lock().push(Message::Error(message.to_string()));
    }

    fn debug(&self, message: &str) {
        self.messages.lock().push(Message::Debug(message.to_string()));
    }
}

pub fn collaborators(
    connector: FakeConnector,
    branch: &str,
) -> (Collaborators, Arc<FakeConnector>, Arc<RecordingNotifier>) {
    let connector = Arc::new(connector);
    let notifier = Arc::new(RecordingNotifier::default());

    let collaborators = Collaborators {
        connector: Arc::clone(&connector) as _,
        vcs: Arc::new(FakeVcs::on(branch)),
        notifier: Arc::clone(&notifier) as _,
    };

    (collaborators, connector, notifier)
}
