use crate::error::TripParseError;
use std::collections::HashMap;
use tripsplit_domain::{ParticipantId, ParticipantRegistry, SettlementContext, Trip};

pub trait TripParser: Send + Sync {
    fn parse(&self, content: &str, context: SettlementContext) -> Result<Trip, TripParseError>;
}

pub trait MemberDirectory: Send + Sync {
    fn display_name(&self, member_id: ParticipantId) -> Option<&str>;
}

impl MemberDirectory for HashMap<ParticipantId, String> {
    fn display_name(&self, member_id: ParticipantId) -> Option<&str> {
        self.get(&member_id).map(String::as_str)
    }
}

impl MemberDirectory for ParticipantRegistry {
    fn display_name(&self, member_id: ParticipantId) -> Option<&str> {
        self.name(member_id)
    }
}

impl MemberDirectory for Trip {
    fn display_name(&self, member_id: ParticipantId) -> Option<&str> {
        self.registry().name(member_id)
    }
}
