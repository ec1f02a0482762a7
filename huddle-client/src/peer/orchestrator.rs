use crate::events::ClientEvent;
use crate::media::LocalTrack;
use crate::peer::link::{LinkState, PeerLink};
use crate::peer::transport::{
    PeerEvent, PeerTransport, PeerTransportFactory, TransportError, TransportEvent,
};
use huddle_core::{ConnectionId, IceServerConfig, SignalRequest};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Completion of a spawned negotiation step. Tagged with the link
/// generation so a completion that raced a teardown (peer left while the
/// description was still being built) can be recognized and discarded.
#[derive(Debug)]
pub enum NegotiationOutcome {
    OfferReady {
        peer: ConnectionId,
        generation: u64,
        result: Result<serde_json::Value, TransportError>,
    },
    AnswerReady {
        peer: ConnectionId,
        generation: u64,
        result: Result<serde_json::Value, TransportError>,
    },
    RemoteApplied {
        peer: ConnectionId,
        generation: u64,
        result: Result<(), TransportError>,
    },
}

/// One negotiation state machine per remote participant, all driving the
/// opaque peer transports. Owned by the session worker; every handler
/// runs to completion inside that single loop, so links never see
/// concurrent mutation. The slow transport steps are spawned off and
/// re-enter through the negotiation channel.
pub struct PeerOrchestrator {
    links: HashMap<ConnectionId, PeerLink>,
    next_generation: u64,
    local_tracks: Vec<LocalTrack>,
    ice_servers: Vec<IceServerConfig>,
    factory: Arc<dyn PeerTransportFactory>,
    transport_events: mpsc::Sender<PeerEvent>,
    negotiation_tx: mpsc::Sender<NegotiationOutcome>,
    outbox: mpsc::UnboundedSender<SignalRequest>,
    events: mpsc::UnboundedSender<ClientEvent>,
}

impl PeerOrchestrator {
    pub fn new(
        factory: Arc<dyn PeerTransportFactory>,
        ice_servers: Vec<IceServerConfig>,
        transport_events: mpsc::Sender<PeerEvent>,
        negotiation_tx: mpsc::Sender<NegotiationOutcome>,
        outbox: mpsc::UnboundedSender<SignalRequest>,
        events: mpsc::UnboundedSender<ClientEvent>,
    ) -> Self {
        Self {
            links: HashMap::new(),
            next_generation: 0,
            local_tracks: Vec::new(),
            ice_servers,
            factory,
            transport_events,
            negotiation_tx,
            outbox,
            events,
        }
    }

    /// Tracks captured at join time; attached to every transport created
    /// from here on.
    pub fn set_local_tracks(&mut self, tracks: Vec<LocalTrack>) {
        self.local_tracks = tracks;
    }

    pub fn link_state(&self, id: &ConnectionId) -> Option<LinkState> {
        self.links.get(id).map(|link| link.state)
    }

    pub fn has_links(&self) -> bool {
        !self.links.is_empty()
    }

    /// Initiator path: a new participant appeared, the local side opens
    /// the edge and sends the offer.
    pub async fn initiate(&mut self, remote: ConnectionId) {
        if self.links.contains_key(&remote) {
            debug!("Link to {} already exists, not initiating", remote);
            return;
        }

        info!("Initiating peer link to {}", remote);

        let transport = match self.create_transport(remote).await {
            Ok(t) => t,
            Err(e) => {
                warn!("Failed to create transport for {}: {}", remote, e);
                let _ = self.events.send(ClientEvent::PeerUnreachable { id: remote });
                return;
            }
        };

        let generation = self.next_gen();
        self.links
            .insert(remote, PeerLink::new(remote, transport.clone(), generation));

        let tx = self.negotiation_tx.clone();
        tokio::spawn(async move {
            let result = transport.create_offer().await;
            let _ = tx
                .send(NegotiationOutcome::OfferReady {
                    peer: remote,
                    generation,
                    result,
                })
                .await;
        });
    }

    /// Responder path. Reuses the existing link's transport if one is
    /// already up for this peer.
    pub async fn handle_offer(&mut self, from: ConnectionId, offer: serde_json::Value) {
        let (transport, generation) = match self.links.get_mut(&from) {
            Some(link) if link.is_closed() => {
                debug!("Offer from {} for a closed link, ignoring", from);
                return;
            }
            Some(link) => {
                link.set_state(LinkState::OfferReceived);
                (link.transport.clone(), link.generation)
            }
            None => {
                info!("Incoming offer from new peer {}", from);

                let transport = match self.create_transport(from).await {
                    Ok(t) => t,
                    Err(e) => {
                        warn!("Failed to create transport for {}: {}", from, e);
                        let _ = self.events.send(ClientEvent::PeerUnreachable { id: from });
                        return;
                    }
                };

                let generation = self.next_gen();
                let mut link = PeerLink::new(from, transport.clone(), generation);
                link.set_state(LinkState::OfferReceived);
                self.links.insert(from, link);

                (transport, generation)
            }
        };

        let tx = self.negotiation_tx.clone();
        tokio::spawn(async move {
            let result = match transport.set_remote_description(offer).await {
                Ok(()) => transport.create_answer().await,
                Err(e) => Err(e),
            };
            let _ = tx
                .send(NegotiationOutcome::AnswerReady {
                    peer: from,
                    generation,
                    result,
                })
                .await;
        });
    }

    pub async fn handle_answer(&mut self, from: ConnectionId, answer: serde_json::Value) {
        let Some(link) = self.links.get_mut(&from) else {
            debug!("Answer from unknown peer {}, ignoring", from);
            return;
        };

        if link.state != LinkState::AwaitingAnswer {
            warn!(
                "Answer from {} in state {:?}, ignoring",
                from, link.state
            );
            return;
        }

        let transport = link.transport.clone();
        let generation = link.generation;

        let tx = self.negotiation_tx.clone();
        tokio::spawn(async move {
            let result = transport.set_remote_description(answer).await;
            let _ = tx
                .send(NegotiationOutcome::RemoteApplied {
                    peer: from,
                    generation,
                    result,
                })
                .await;
        });
    }

    /// Candidates flow independently of the offer/answer round trip. Ones
    /// that beat the remote description are buffered on the link and
    /// replayed, in arrival order, the moment it lands.
    pub async fn handle_candidate(&mut self, from: ConnectionId, candidate: serde_json::Value) {
        let Some(link) = self.links.get_mut(&from) else {
            debug!("Candidate for unknown peer {}, dropping", from);
            return;
        };

        if link.is_closed() {
            return;
        }

        if link.remote_described() {
            let transport = link.transport.clone();
            if let Err(e) = transport.add_candidate(candidate).await {
                warn!("Failed to add candidate for {}: {}", from, e);
            }
        } else {
            link.buffer_candidate(candidate);
        }
    }

    pub async fn handle_negotiation(&mut self, outcome: NegotiationOutcome) {
        match outcome {
            NegotiationOutcome::OfferReady {
                peer,
                generation,
                result,
            } => match result {
                Ok(offer) => {
                    let Some(link) = self.live_link(&peer, generation) else {
                        debug!("Stale offer completion for {}, dropped", peer);
                        return;
                    };
                    link.set_state(LinkState::OfferCreated);

                    let _ = self.outbox.send(SignalRequest::Offer { to: peer, offer });

                    if let Some(link) = self.live_link(&peer, generation) {
                        link.set_state(LinkState::AwaitingAnswer);
                    }
                }
                Err(e) => self.fail_link(peer, generation, e),
            },

            NegotiationOutcome::AnswerReady {
                peer,
                generation,
                result,
            } => match result {
                Ok(answer) => {
                    let Some(link) = self.live_link(&peer, generation) else {
                        debug!("Stale answer completion for {}, dropped", peer);
                        return;
                    };

                    // Remote description is in; replay what queued up
                    // behind it before anything else happens on the link.
                    let transport = link.transport.clone();
                    let pending = link.mark_remote_described();
                    self.apply_pending(peer, transport, pending).await;

                    if let Some(link) = self.live_link(&peer, generation) {
                        link.set_state(LinkState::AnswerCreated);
                        link.set_state(LinkState::Connected);
                    }

                    let _ = self.outbox.send(SignalRequest::Answer { to: peer, answer });
                    info!("Link to {} connected (responder)", peer);
                }
                Err(e) => self.fail_link(peer, generation, e),
            },

            NegotiationOutcome::RemoteApplied {
                peer,
                generation,
                result,
            } => match result {
                Ok(()) => {
                    let Some(link) = self.live_link(&peer, generation) else {
                        debug!("Stale apply completion for {}, dropped", peer);
                        return;
                    };

                    let transport = link.transport.clone();
                    let pending = link.mark_remote_described();
                    self.apply_pending(peer, transport, pending).await;

                    if let Some(link) = self.live_link(&peer, generation) {
                        link.set_state(LinkState::Connected);
                    }
                    info!("Link to {} connected (initiator)", peer);
                }
                Err(e) => self.fail_link(peer, generation, e),
            },
        }
    }

    pub async fn handle_transport_event(&mut self, event: PeerEvent) {
        let PeerEvent { peer, event } = event;

        let Some(link) = self.links.get_mut(&peer) else {
            debug!("Transport event for gone peer {}, dropped", peer);
            return;
        };
        if link.is_closed() {
            return;
        }

        match event {
            TransportEvent::CandidateDiscovered(candidate) => {
                // Forwarded one by one as discovered, no batching.
                let _ = self.outbox.send(SignalRequest::IceCandidate {
                    to: peer,
                    candidate,
                });
            }

            TransportEvent::RemoteTrack(stream) => {
                link.remote_stream = Some(stream);
                let _ = self.events.send(ClientEvent::RemoteStreamAdded {
                    id: peer,
                    stream,
                });
            }

            TransportEvent::Failed => {
                warn!("Peer transport for {} failed", peer);
                link.set_state(LinkState::Closed);
                let transport = link.transport.clone();
                tokio::spawn(async move { transport.close().await });
                let _ = self.events.send(ClientEvent::PeerUnreachable { id: peer });
            }
        }
    }

    /// Drops the link and closes its transport. Safe to call for ids
    /// without a link, and safe to race against in-flight negotiation
    /// steps (their completions fail the generation check).
    pub fn teardown(&mut self, remote: &ConnectionId) {
        let Some(mut link) = self.links.remove(remote) else {
            return;
        };

        info!("Tearing down peer link to {}", remote);
        link.set_state(LinkState::Closed);

        let transport = link.transport.clone();
        tokio::spawn(async move { transport.close().await });

        if link.remote_stream.take().is_some() {
            let _ = self
                .events
                .send(ClientEvent::RemoteStreamRemoved { id: *remote });
        }
    }

    pub fn teardown_all(&mut self) {
        let peers: Vec<ConnectionId> = self.links.keys().copied().collect();
        for peer in peers {
            self.teardown(&peer);
        }
    }

    fn next_gen(&mut self) -> u64 {
        self.next_generation += 1;
        self.next_generation
    }

    fn live_link(&mut self, peer: &ConnectionId, generation: u64) -> Option<&mut PeerLink> {
        self.links
            .get_mut(peer)
            .filter(|link| link.generation == generation && !link.is_closed())
    }

    fn fail_link(&mut self, peer: ConnectionId, generation: u64, error: TransportError) {
        let Some(link) = self.live_link(&peer, generation) else {
            debug!("Stale failure for {} ignored: {}", peer, error);
            return;
        };

        warn!("Negotiation with {} failed: {}", peer, error);
        link.set_state(LinkState::Closed);

        let transport = link.transport.clone();
        tokio::spawn(async move { transport.close().await });

        let _ = self.events.send(ClientEvent::PeerUnreachable { id: peer });
    }

    async fn create_transport(
        &self,
        remote: ConnectionId,
    ) -> Result<Arc<dyn PeerTransport>, TransportError> {
        let transport = self
            .factory
            .create(remote, &self.ice_servers, self.transport_events.clone())
            .await?;

        for track in &self.local_tracks {
            transport.add_track(track.clone()).await?;
        }

        Ok(transport)
    }

    async fn apply_pending(
        &self,
        peer: ConnectionId,
        transport: Arc<dyn PeerTransport>,
        pending: std::collections::VecDeque<serde_json::Value>,
    ) {
        if pending.is_empty() {
            return;
        }

        debug!("Replaying {} buffered candidates for {}", pending.len(), peer);
        for candidate in pending {
            if let Err(e) = transport.add_candidate(candidate).await {
                warn!("Buffered candidate for {} rejected: {}", peer, e);
            }
        }
    }
}
