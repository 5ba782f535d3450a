use std::collections::HashMap;

use chrono::Utc;
use tokio::sync::mpsc;
use tracing::{debug, error, info, instrument};

use crate::clients::{DirectoryClient, FriendshipClient};
use crate::domain::{Friendship, FriendshipStatus};
use crate::error::FriendshipError;
use crate::messages::{FriendshipRequest, ServiceResponse};

// =============================================================================
// PURE EDGE STORE
// =============================================================================

/// In-memory friendship-edge store. All invariant checks live here so they
/// can be unit-tested without the actor shell. Invariant: at most one edge
/// per unordered pair is Pending or Accepted; Rejected edges are terminal and
/// may accumulate.
pub struct FriendshipGraph {
    edges: HashMap<String, Friendship>,
    order: Vec<String>,
    next_id: u64,
}

impl Default for FriendshipGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl FriendshipGraph {
    pub fn new() -> Self {
        Self {
            edges: HashMap::new(),
            order: Vec::new(),
            next_id: 1,
        }
    }

    fn active_edge(&self, a: &str, b: &str) -> Option<&Friendship> {
        self.edges
            .values()
            .find(|e| e.status.is_active() && e.joins(a, b))
    }

    /// Creates a Pending edge. The duplicate check covers both directions
    /// and only Pending/Accepted edges; a pair rejected in the past may be
    /// requested again.
    pub fn send_request(
        &mut self,
        requester_id: &str,
        addressee_id: &str,
    ) -> Result<Friendship, FriendshipError> {
        if requester_id == addressee_id {
            return Err(FriendshipError::SelfRequest);
        }
        if self.active_edge(requester_id, addressee_id).is_some() {
            return Err(FriendshipError::DuplicateRequest(
                requester_id.to_string(),
                addressee_id.to_string(),
            ));
        }

        let id = format!("friendship_{}", self.next_id);
        self.next_id += 1;

        let edge = Friendship {
            id: id.clone(),
            requester_id: requester_id.to_string(),
            addressee_id: addressee_id.to_string(),
            status: FriendshipStatus::Pending,
            created_at: Utc::now(),
        };
        self.edges.insert(id.clone(), edge.clone());
        self.order.push(id);
        Ok(edge)
    }

    /// Pending -> Accepted. Only the addressee may accept.
    pub fn accept(
        &mut self,
        friendship_id: &str,
        acting_user_id: &str,
    ) -> Result<Friendship, FriendshipError> {
        self.resolve(friendship_id, acting_user_id, FriendshipStatus::Accepted)
    }

    /// Pending -> Rejected. Only the addressee may reject.
    pub fn reject(
        &mut self,
        friendship_id: &str,
        acting_user_id: &str,
    ) -> Result<Friendship, FriendshipError> {
        self.resolve(friendship_id, acting_user_id, FriendshipStatus::Rejected)
    }

    fn resolve(
        &mut self,
        friendship_id: &str,
        acting_user_id: &str,
        status: FriendshipStatus,
    ) -> Result<Friendship, FriendshipError> {
        let edge = self
            .edges
            .get_mut(friendship_id)
            .ok_or_else(|| FriendshipError::NotFound(friendship_id.to_string()))?;

        if edge.addressee_id != acting_user_id {
            return Err(FriendshipError::Forbidden(
                "Only the addressee can resolve this request".to_string(),
            ));
        }
        if edge.status != FriendshipStatus::Pending {
            return Err(FriendshipError::InvalidState(
                "Request is not pending".to_string(),
            ));
        }

        edge.status = status;
        Ok(edge.clone())
    }

    /// Hard delete, returning the pair to "no relation". Either party may
    /// remove, regardless of edge status.
    pub fn remove(
        &mut self,
        friendship_id: &str,
        acting_user_id: &str,
    ) -> Result<(), FriendshipError> {
        let edge = self
            .edges
            .get(friendship_id)
            .ok_or_else(|| FriendshipError::NotFound(friendship_id.to_string()))?;

        if !edge.involves(acting_user_id) {
            return Err(FriendshipError::Forbidden(
                "You are not part of this friendship".to_string(),
            ));
        }

        self.edges.remove(friendship_id);
        self.order.retain(|id| id != friendship_id);
        Ok(())
    }

    /// Accepted edges touching the user, either side.
    pub fn list_friends(&self, user_id: &str) -> Vec<Friendship> {
        self.order
            .iter()
            .filter_map(|id| self.edges.get(id))
            .filter(|e| e.status == FriendshipStatus::Accepted && e.involves(user_id))
            .cloned()
            .collect()
    }

    /// Incoming Pending requests only: the user is the addressee.
    pub fn list_pending(&self, user_id: &str) -> Vec<Friendship> {
        self.order
            .iter()
            .filter_map(|id| self.edges.get(id))
            .filter(|e| e.status == FriendshipStatus::Pending && e.addressee_id == user_id)
            .cloned()
            .collect()
    }

    /// True iff an Accepted edge joins the pair, in either direction.
    pub fn are_connected(&self, a: &str, b: &str) -> bool {
        self.edges
            .values()
            .any(|e| e.status == FriendshipStatus::Accepted && e.joins(a, b))
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }
}

// =============================================================================
// FRIENDSHIP SERVICE (SUB-ACTOR)
// =============================================================================

/// The friendship graph behind a mailbox. The duplicate check and the edge
/// insert run inside one handler turn, so concurrent requests for the same
/// pair cannot both pass.
pub struct FriendshipService {
    receiver: mpsc::Receiver<FriendshipRequest>,
    graph: FriendshipGraph,
}

impl FriendshipService {
    pub fn new(buffer_size: usize, directory: DirectoryClient) -> (Self, FriendshipClient) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let service = Self {
            receiver,
            graph: FriendshipGraph::new(),
        };
        let client = FriendshipClient::new(sender, directory);
        (service, client)
    }

    #[instrument(name = "friendship_service", skip(self))]
    pub async fn run(mut self) {
        info!("FriendshipService starting");

        while let Some(msg) = self.receiver.recv().await {
            match msg {
                FriendshipRequest::SendRequest {
                    requester_id,
                    addressee_id,
                    respond_to,
                } => {
                    self.handle_send_request(requester_id, addressee_id, respond_to);
                }
                FriendshipRequest::Accept {
                    friendship_id,
                    acting_user_id,
                    respond_to,
                } => {
                    self.handle_accept(friendship_id, acting_user_id, respond_to);
                }
                FriendshipRequest::Reject {
                    friendship_id,
                    acting_user_id,
                    respond_to,
                } => {
                    self.handle_reject(friendship_id, acting_user_id, respond_to);
                }
                FriendshipRequest::Remove {
                    friendship_id,
                    acting_user_id,
                    respond_to,
                } => {
                    self.handle_remove(friendship_id, acting_user_id, respond_to);
                }
                FriendshipRequest::ListFriends {
                    user_id,
                    respond_to,
                } => {
                    debug!("Processing list_friends request");
                    let _ = respond_to.send(Ok(self.graph.list_friends(&user_id)));
                }
                FriendshipRequest::ListPending {
                    user_id,
                    respond_to,
                } => {
                    debug!("Processing list_pending request");
                    let _ = respond_to.send(Ok(self.graph.list_pending(&user_id)));
                }
                FriendshipRequest::AreConnected { a, b, respond_to } => {
                    debug!("Processing are_connected request");
                    let _ = respond_to.send(Ok(self.graph.are_connected(&a, &b)));
                }
                FriendshipRequest::Shutdown => {
                    info!("FriendshipService shutting down");
                    break;
                }
                #[cfg(test)]
                FriendshipRequest::GetEdgeCount { respond_to } => {
                    let _ = respond_to.send(Ok(self.graph.len()));
                }
            }
        }

        info!("FriendshipService stopped");
    }

    #[instrument(fields(requester_id = %requester_id, addressee_id = %addressee_id), skip(self, respond_to))]
    fn handle_send_request(
        &mut self,
        requester_id: String,
        addressee_id: String,
        respond_to: ServiceResponse<Friendship, FriendshipError>,
    ) {
        debug!("Processing send_request request");

        let result = self.graph.send_request(&requester_id, &addressee_id);
        match &result {
            Ok(edge) => info!(friendship_id = %edge.id, "Friend request created"),
            Err(e) => error!(error = %e, "Friend request refused"),
        }
        let _ = respond_to.send(result);
    }

    #[instrument(fields(friendship_id = %friendship_id, acting_user_id = %acting_user_id), skip(self, respond_to))]
    fn handle_accept(
        &mut self,
        friendship_id: String,
        acting_user_id: String,
        respond_to: ServiceResponse<Friendship, FriendshipError>,
    ) {
        debug!("Processing accept request");

        let result = self.graph.accept(&friendship_id, &acting_user_id);
        match &result {
            Ok(edge) => info!(status = %edge.status, "Friend request accepted"),
            Err(e) => error!(error = %e, "Accept refused"),
        }
        let _ = respond_to.send(result);
    }

    #[instrument(fields(friendship_id = %friendship_id, acting_user_id = %acting_user_id), skip(self, respond_to))]
    fn handle_reject(
        &mut self,
        friendship_id: String,
        acting_user_id: String,
        respond_to: ServiceResponse<Friendship, FriendshipError>,
    ) {
        debug!("Processing reject request");

        let result = self.graph.reject(&friendship_id, &acting_user_id);
        match &result {
            Ok(edge) => info!(status = %edge.status, "Friend request rejected"),
            Err(e) => error!(error = %e, "Reject refused"),
        }
        let _ = respond_to.send(result);
    }

    #[instrument(fields(friendship_id = %friendship_id, acting_user_id = %acting_user_id), skip(self, respond_to))]
    fn handle_remove(
        &mut self,
        friendship_id: String,
        acting_user_id: String,
        respond_to: ServiceResponse<(), FriendshipError>,
    ) {
        debug!("Processing remove request");

        let result = self.graph.remove(&friendship_id, &acting_user_id);
        match &result {
            Ok(()) => info!("Friendship removed"),
            Err(e) => error!(error = %e, "Remove refused"),
        }
        let _ = respond_to.send(result);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn self_request_is_refused() {
        let mut graph = FriendshipGraph::new();
        let err = graph.send_request("user_1", "user_1").unwrap_err();
        assert_eq!(err, FriendshipError::SelfRequest);
        assert!(graph.is_empty());
    }

    #[test]
    fn one_active_edge_per_pair_either_direction() {
        let mut graph = FriendshipGraph::new();
        graph.send_request("user_1", "user_2").unwrap();

        let same = graph.send_request("user_1", "user_2").unwrap_err();
        assert!(matches!(same, FriendshipError::DuplicateRequest(_, _)));

        let reversed = graph.send_request("user_2", "user_1").unwrap_err();
        assert!(matches!(reversed, FriendshipError::DuplicateRequest(_, _)));

        assert_eq!(graph.len(), 1);
    }

    #[test]
    fn only_the_addressee_resolves_a_pending_request() {
        let mut graph = FriendshipGraph::new();
        let edge = graph.send_request("user_1", "user_2").unwrap();

        let err = graph.accept(&edge.id, "user_1").unwrap_err();
        assert!(matches!(err, FriendshipError::Forbidden(_)));

        let accepted = graph.accept(&edge.id, "user_2").unwrap();
        assert_eq!(accepted.status, FriendshipStatus::Accepted);

        // already resolved
        let err = graph.reject(&edge.id, "user_2").unwrap_err();
        assert!(matches!(err, FriendshipError::InvalidState(_)));
    }

    #[test]
    fn rejected_edges_are_terminal_and_excluded_from_uniqueness() {
        let mut graph = FriendshipGraph::new();
        let first = graph.send_request("user_1", "user_2").unwrap();
        graph.reject(&first.id, "user_2").unwrap();

        // a new request after rejection creates a new edge
        let second = graph.send_request("user_1", "user_2").unwrap();
        assert_ne!(first.id, second.id);
        assert_eq!(graph.len(), 2);

        // the old edge stays rejected and cannot be resolved again
        let err = graph.accept(&first.id, "user_2").unwrap_err();
        assert!(matches!(err, FriendshipError::InvalidState(_)));
    }

    #[test]
    fn accepted_edges_are_symmetric_in_queries() {
        let mut graph = FriendshipGraph::new();
        let edge = graph.send_request("user_1", "user_2").unwrap();
        graph.accept(&edge.id, "user_2").unwrap();

        assert!(graph.are_connected("user_1", "user_2"));
        assert!(graph.are_connected("user_2", "user_1"));
        assert_eq!(graph.list_friends("user_1").len(), 1);
        assert_eq!(graph.list_friends("user_2").len(), 1);
    }

    #[test]
    fn remove_returns_the_pair_to_no_relation() {
        let mut graph = FriendshipGraph::new();
        let edge = graph.send_request("user_1", "user_2").unwrap();
        graph.accept(&edge.id, "user_2").unwrap();

        let err = graph.remove(&edge.id, "user_3").unwrap_err();
        assert!(matches!(err, FriendshipError::Forbidden(_)));

        graph.remove(&edge.id, "user_1").unwrap();
        assert!(!graph.are_connected("user_1", "user_2"));

        // the slot is free again
        graph.send_request("user_2", "user_1").unwrap();
    }

    #[test]
    fn pending_lists_only_incoming_requests() {
        let mut graph = FriendshipGraph::new();
        graph.send_request("user_1", "user_2").unwrap();
        graph.send_request("user_3", "user_1").unwrap();

        // user_1 sent one and received one; only the incoming edge is pending
        let pending = graph.list_pending("user_1");
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].requester_id, "user_3");

        assert_eq!(graph.list_pending("user_2").len(), 1);
        assert_eq!(graph.list_pending("user_3").len(), 0);
    }

    #[test]
    fn requester_can_withdraw_a_pending_request() {
        let mut graph = FriendshipGraph::new();
        let edge = graph.send_request("user_1", "user_2").unwrap();

        graph.remove(&edge.id, "user_1").unwrap();
        assert!(graph.is_empty());
        assert!(graph.list_pending("user_2").is_empty());
    }
}
