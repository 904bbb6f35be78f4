use core::marker::PhantomData;
use std::collections::HashMap;

use anyhow::Result;
use async_trait::async_trait;
use helper_functions::misc;
use log::debug;
use tonic::transport::{Channel, Endpoint};
use types::{
    assignments::EpochAssignments,
    consensus::{Attestation, Block, ChainHead, Validator, ValidatorQueue},
    preset::Preset,
    primitives::{Epoch, Gwei, PublicKeyBytes, Slot, ValidatorIndex},
};

use crate::{
    backend::{Backend, ParticipationBalances},
    config::Config,
    error::Error,
    grpc::{
        conversions,
        proto::{
            self, beacon_chain_client::BeaconChainClient, get_validator_participation_request,
            list_blocks_request, list_validator_assignments_request,
            list_validator_balances_request, list_validators_request,
        },
    },
};

const PAGE_SIZE: i32 = 250;

/// [`Backend`] for the Prysm `BeaconChain` gRPC service.
pub struct GrpcBackend<P: Preset> {
    client: BeaconChainClient<Channel>,
    phantom: PhantomData<P>,
}

impl<P: Preset> GrpcBackend<P> {
    /// Creates a backend without connecting. The channel connects on first use.
    pub fn new(config: &Config) -> Result<Self> {
        let channel = Endpoint::from_shared(config.url.as_url().to_string())?
            .timeout(config.request_timeout)
            .connect_lazy();

        Ok(Self {
            client: BeaconChainClient::new(channel),
            phantom: PhantomData,
        })
    }

    // `BeaconChainClient` methods take `&mut self`. Clones share the underlying channel.
    fn client(&self) -> BeaconChainClient<Channel> {
        self.client.clone()
    }

    async fn balances(&self, epoch: Epoch) -> Result<Vec<proto::validator_balances::Balance>> {
        let mut balances = vec![];
        let mut page_token = String::new();

        loop {
            let request = proto::ListValidatorBalancesRequest {
                query_filter: Some(list_validator_balances_request::QueryFilter::Epoch(epoch)),
                page_size: PAGE_SIZE,
                page_token: page_token.clone(),
                ..proto::ListValidatorBalancesRequest::default()
            };

            let response = self
                .client()
                .list_validator_balances(request)
                .await?
                .into_inner();

            balances.extend(response.balances);

            match next_page_token(&page_token, response.next_page_token)? {
                Some(token) => page_token = token,
                None => break,
            }
        }

        debug!("received {} validator balances for epoch {epoch}", balances.len());

        Ok(balances)
    }

    async fn public_key_indices(
        &self,
        epoch: Epoch,
    ) -> Result<HashMap<PublicKeyBytes, ValidatorIndex>> {
        self.balances(epoch)
            .await?
            .into_iter()
            .map(|balance| {
                let public_key =
                    conversions::public_key("balance.public_key", &balance.public_key)?;

                Ok((public_key, balance.index))
            })
            .collect()
    }
}

#[async_trait]
impl<P: Preset> Backend for GrpcBackend<P> {
    async fn chain_head(&self) -> Result<ChainHead> {
        let chain_head = self
            .client()
            .get_chain_head(proto::Empty {})
            .await?
            .into_inner();

        conversions::chain_head::<P>(&chain_head)
    }

    async fn epoch_assignments(&self, epoch: Epoch) -> Result<EpochAssignments> {
        let indices = self.public_key_indices(epoch).await?;

        let mut committee_assignments = vec![];
        let mut page_token = String::new();

        loop {
            let request = proto::ListValidatorAssignmentsRequest {
                query_filter: Some(list_validator_assignments_request::QueryFilter::Epoch(epoch)),
                page_size: PAGE_SIZE,
                page_token: page_token.clone(),
                ..proto::ListValidatorAssignmentsRequest::default()
            };

            let response = self
                .client()
                .list_validator_assignments(request)
                .await?
                .into_inner();

            committee_assignments.extend(response.assignments);

            match next_page_token(&page_token, response.next_page_token)? {
                Some(token) => page_token = token,
                None => break,
            }
        }

        conversions::epoch_assignments(epoch, &committee_assignments, &indices)
    }

    async fn blocks_by_slot(&self, slot: Slot) -> Result<Vec<Block>> {
        let request = proto::ListBlocksRequest {
            query_filter: Some(list_blocks_request::QueryFilter::Slot(slot)),
            page_size: PAGE_SIZE,
            page_token: String::new(),
        };

        let response = self.client().list_blocks(request).await?.into_inner();

        conversions::convert_all(response.block_containers)
    }

    async fn validators(&self, epoch: Epoch) -> Result<Vec<Validator>> {
        let balances = self
            .balances(epoch)
            .await?
            .into_iter()
            .map(|balance| (balance.index, balance.balance))
            .collect::<HashMap<ValidatorIndex, Gwei>>();

        let mut validators = vec![];
        let mut page_token = String::new();

        loop {
            let request = proto::ListValidatorsRequest {
                query_filter: Some(list_validators_request::QueryFilter::Epoch(epoch)),
                page_size: PAGE_SIZE,
                page_token: page_token.clone(),
                ..proto::ListValidatorsRequest::default()
            };

            let response = self.client().list_validators(request).await?.into_inner();

            for container in response.validator_list {
                let balance = balances.get(&container.index).copied().unwrap_or_default();
                validators.push(conversions::validator(container, balance)?);
            }

            match next_page_token(&page_token, response.next_page_token)? {
                Some(token) => page_token = token,
                None => break,
            }
        }

        Ok(validators)
    }

    async fn validator_queue(&self) -> Result<ValidatorQueue> {
        let queue = self
            .client()
            .get_validator_queue(proto::Empty {})
            .await?
            .into_inner();

        conversions::validator_queue(queue)
    }

    async fn attestation_pool(&self) -> Result<Vec<Attestation>> {
        let mut attestations = vec![];
        let mut page_token = String::new();

        loop {
            let request = proto::AttestationPoolRequest {
                page_size: PAGE_SIZE,
                page_token: page_token.clone(),
            };

            let response = self.client().attestation_pool(request).await?.into_inner();

            attestations.extend(conversions::convert_all(response.attestations)?);

            match next_page_token(&page_token, response.next_page_token)? {
                Some(token) => page_token = token,
                None => break,
            }
        }

        Ok(attestations)
    }

    async fn participation_balances(&self, epoch: Epoch) -> Result<ParticipationBalances> {
        // Figures for an epoch are only final once the next one has been processed.
        let next_epoch = misc::next_epoch(epoch)?;

        let request = proto::GetValidatorParticipationRequest {
            query_filter: Some(get_validator_participation_request::QueryFilter::Epoch(
                next_epoch,
            )),
        };

        let response = self
            .client()
            .get_validator_participation(request)
            .await?
            .into_inner();

        conversions::participation_balances(response)
    }
}

/// Token for the page after the one requested with `previous`, or `None` after the last page.
fn next_page_token(previous: &str, next: String) -> Result<Option<String>> {
    if next.is_empty() {
        return Ok(None);
    }

    if next == previous {
        return Err(Error::PageTokenRepeated { token: next }.into());
    }

    Ok(Some(next))
}

#[cfg(test)]
mod tests {
    use types::preset::Mainnet;

    use crate::config::BackendKind;

    use super::*;

    #[test]
    fn pagination_stops_at_empty_token() -> Result<()> {
        assert_eq!(next_page_token("", String::new())?, None);
        assert_eq!(next_page_token("1", String::new())?, None);
        assert_eq!(next_page_token("", "1".to_owned())?, Some("1".to_owned()));
        assert_eq!(next_page_token("1", "2".to_owned())?, Some("2".to_owned()));
        Ok(())
    }

    #[test]
    fn pagination_rejects_repeated_token() {
        let error = next_page_token("7", "7".to_owned())
            .expect_err("repeated token should be rejected")
            .downcast::<Error>()
            .expect("error should come from this crate");

        assert_eq!(
            error,
            Error::PageTokenRepeated {
                token: "7".to_owned(),
            },
        );
    }

    #[tokio::test]
    async fn backend_is_created_without_connecting() -> Result<()> {
        let config = Config::new(BackendKind::Grpc, "http://localhost:4000".parse()?);
        GrpcBackend::<Mainnet>::new(&config)?;
        Ok(())
    }
}
