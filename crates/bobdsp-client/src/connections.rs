//! Connection rule editing.

use bobdsp_types::pattern;
use bobdsp_types::protocol::ConnectionsAction;
use bobdsp_types::ConnectionRule;
use std::sync::Arc;

use crate::client::BobDspClient;
use crate::error::ClientError;
use crate::transport::Transport;

/// Local copy of the host's ordered connection rules.
///
/// Edits stay local until [`apply`](Self::apply). Every host answer replaces
/// the local list as a whole, so the list always ends up exactly as the host
/// accepted it.
pub struct ConnectionEditor<T: Transport> {
    api: Arc<BobDspClient<T>>,
    rules: Vec<ConnectionRule>,
}

impl<T: Transport> ConnectionEditor<T> {
    pub fn new(api: Arc<BobDspClient<T>>) -> Self {
        Self {
            api,
            rules: Vec::new(),
        }
    }

    pub fn rules(&self) -> &[ConnectionRule] {
        &self.rules
    }

    pub fn rules_mut(&mut self) -> &mut Vec<ConnectionRule> {
        &mut self.rules
    }

    /// Replaces the local list with the host's.
    pub async fn load(&mut self) -> Result<&[ConnectionRule], ClientError> {
        self.rules = self.api.fetch_connections().await?;
        tracing::debug!("Loaded {} connection rules", self.rules.len());
        Ok(&self.rules)
    }

    /// Sends the local list to the host.
    pub async fn apply(&mut self) -> Result<&[ConnectionRule], ClientError> {
        self.send(true, None).await
    }

    /// Sends the local list and asks the host to persist it.
    pub async fn apply_and_save(&mut self) -> Result<&[ConnectionRule], ClientError> {
        self.send(true, Some(ConnectionsAction::Save)).await
    }

    /// Asks the host to reload its persisted rules, dropping local edits.
    pub async fn restore(&mut self) -> Result<&[ConnectionRule], ClientError> {
        self.send(false, Some(ConnectionsAction::Reload)).await
    }

    async fn send(
        &mut self,
        with_rules: bool,
        action: Option<ConnectionsAction>,
    ) -> Result<&[ConnectionRule], ClientError> {
        for rule in &self.rules {
            for bad in rule.invalid_patterns() {
                tracing::warn!("Connection pattern {:?} is not a valid regex and matches nothing", bad);
            }
        }

        let rules = with_rules.then_some(self.rules.as_slice());
        let accepted = self.api.post_connections(rules, action).await?;
        tracing::info!("Host holds {} connection rules after {:?}", accepted.len(), action);
        self.rules = accepted;
        Ok(&self.rules)
    }

    pub fn add_rule(&mut self, rule: ConnectionRule) -> usize {
        self.rules.push(rule);
        self.rules.len() - 1
    }

    /// Appends a rule connecting two concrete ports, with numbers wildcarded
    /// when `wildcard` is set.
    pub fn add_from_ports(&mut self, out_port: &str, in_port: &str, wildcard: bool) -> usize {
        self.add_rule(ConnectionRule::new(
            pattern::build(out_port, wildcard),
            pattern::build(in_port, wildcard),
        ))
    }

    pub fn remove(&mut self, index: usize) -> Option<ConnectionRule> {
        (index < self.rules.len()).then(|| self.rules.remove(index))
    }

    /// Moves the rule at `from` to position `to`.
    pub fn move_rule(&mut self, from: usize, to: usize) -> bool {
        if from >= self.rules.len() || to >= self.rules.len() {
            return false;
        }
        let rule = self.rules.remove(from);
        self.rules.insert(to, rule);
        true
    }

    /// Indices of rules whose output pattern matches `port`.
    pub fn matching_out(&self, port: &str) -> Vec<usize> {
        self.rules
            .iter()
            .enumerate()
            .filter(|(_, r)| r.matches_out(port))
            .map(|(i, _)| i)
            .collect()
    }

    /// Indices of rules whose input pattern matches `port`.
    pub fn matching_in(&self, port: &str) -> Vec<usize> {
        self.rules
            .iter()
            .enumerate()
            .filter(|(_, r)| r.matches_in(port))
            .map(|(i, _)| i)
            .collect()
    }
}
