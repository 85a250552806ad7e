use std::time::Duration;

use crate::{Error, Rejection, Result, RetryPolicy};
use ethereum_types::{Address, H256, U64};
use tokio::time::interval;
use web3::{
    contract::{tokens::Tokenize, Contract, Options},
    ethabi,
    signing::SecretKey,
    transports::Http,
    types::{Transaction, TransactionId, U256},
    Web3,
};

#[derive(Debug, Clone)]
pub struct Client {
    client: Web3<Http>,
    minimum_gas_price: Option<U256>,
    retry: RetryPolicy,
}

impl Client {
    pub fn new(rpc: &str, minimum_gas_price_gwei: Option<u64>) -> Result<Client> {
        let client = Web3::new(Http::new(rpc)?);
        let minimum_gas_price = minimum_gas_price_gwei.map(|gwei| U256::from(gwei) * 1_000_000_000);

        Ok(Client {
            client,
            minimum_gas_price,
            retry: RetryPolicy::default(),
        })
    }

    /// Replace the delays used when an RPC request fails with a network error
    #[must_use]
    pub fn with_retry(self, retry: RetryPolicy) -> Self {
        Self { retry, ..self }
    }

    pub fn load_contract_from_str(
        &self,
        address: &str,
        contract_json: &str,
    ) -> Result<Contract<Http>> {
        let contract_json_value = serde_json::from_str::<serde_json::Value>(contract_json)?;
        // unwrap should be fine since the json is embedded at build time
        #[allow(clippy::unwrap_used)]
        let abi_value = contract_json_value.get("abi").unwrap();

        let contract_abi = serde_json::from_value::<ethabi::Contract>(abi_value.clone())?;

        Ok(Contract::new(
            self.client.eth(),
            address.trim_start_matches("0x").parse()?,
            contract_abi,
        ))
    }

    pub fn client(&self) -> &Web3<Http> {
        &self.client
    }

    pub async fn fast_gas_price(&self) -> Result<U256, web3::Error> {
        let gas_price: U256 = self.retry.run(move || self.client.eth().gas_price()).await?;
        let fast_gas_price = gas_price * 2;

        match self.minimum_gas_price {
            Some(minimum_gas_price) if fast_gas_price < minimum_gas_price => Ok(minimum_gas_price),
            _ => Ok(fast_gas_price),
        }
    }

    #[tracing::instrument(err, ret, skip(self))]
    async fn pending_nonce(&self, address: Address) -> Result<U256, web3::Error> {
        self.retry
            .run(move || {
                self.client
                    .eth()
                    .transaction_count(address, Some(web3::types::BlockNumber::Pending))
            })
            .await
    }

    pub(crate) async fn options(&self, address: Address) -> Result<Options, web3::Error> {
        let gas_price = self.fast_gas_price().await?;
        let nonce = self.pending_nonce(address).await?;

        Ok(Options {
            gas: Some(10_000_000.into()),
            gas_price: Some(gas_price),
            nonce: Some(nonce),
            ..Default::default()
        })
    }

    /// Sign and send a contract call, returning the transaction hash
    ///
    /// A call the node refuses to execute (a revert during gas estimation) is a
    /// [`Rejection::Reverted`], not a network failure.
    pub async fn call(
        &self,
        contract: &Contract<Http>,
        func: &str,
        params: impl Tokenize + Clone,
        signer: &SecretKey,
        signer_address: Address,
    ) -> Result<H256> {
        let options = self.options(signer_address).await?;
        let gas = self
            .retry
            .run(|| contract.estimate_gas(func, params.clone(), signer_address, options.clone()))
            .await
            .map_err(|err| match revert_reason(&err) {
                Some(reason) => Error::LedgerRejected(Rejection::Reverted(reason)),
                None => Error::Web3Contract(err),
            })?;

        let call_tx = self
            .retry
            .run(move || {
                contract.signed_call(
                    func,
                    params,
                    web3::contract::Options {
                        gas: Some(gas + gas / 2),
                        ..options
                    },
                    signer,
                )
            })
            .await?;

        Ok(call_tx)
    }

    pub async fn query<R, A, B, P>(
        &self,
        contract: &Contract<Http>,
        func: &str,
        params: P,
        from: A,
        options: Options,
        block: B,
    ) -> Result<R, web3::contract::Error>
    where
        R: web3::contract::tokens::Detokenize,
        A: Into<Option<Address>> + Clone,
        B: Into<Option<web3::types::BlockId>> + Clone,
        P: Tokenize + Clone,
    {
        let result = self
            .retry
            .run(move || contract.query(func, params, from, options, block))
            .await?;

        Ok(result)
    }

    /// Wait for a transaction to be confirmed and returns the block number.
    ///
    /// Times out if a transaction has been unknown (not in mempool) for 60 seconds.
    #[tracing::instrument(err, skip(self))]
    pub async fn wait_for_confirm(&self, txn_hash: H256, interval_period: Duration) -> Result<U64> {
        let unknown_timeout = std::time::Instant::now() + Duration::from_secs(60);

        let mut interval = interval(interval_period);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            interval.tick().await;

            let tx = self
                .retry
                .run(move || self.client.eth().transaction(TransactionId::Hash(txn_hash)))
                .await?;

            match tx {
                None => {
                    // Transaction doesn't exist / is unknown
                    if std::time::Instant::now() > unknown_timeout {
                        return Err(Error::UnknownTransaction(txn_hash));
                    }
                }
                Some(Transaction {
                    block_number: None, ..
                }) => {
                    // Transaction is pending
                }
                Some(Transaction {
                    block_number: Some(block_number),
                    ..
                }) => {
                    // Transaction is confirmed
                    return Ok(block_number);
                }
            }
        }
    }

    /// Wait for a transaction to be mined and fail if it reverted
    #[tracing::instrument(err, skip(self))]
    pub async fn wait_for_success(&self, txn_hash: H256, interval_period: Duration) -> Result<U64> {
        let block_number = self.wait_for_confirm(txn_hash, interval_period).await?;

        let receipt = self
            .retry
            .run(move || self.client.eth().transaction_receipt(txn_hash))
            .await?;

        match receipt.and_then(|r| r.status) {
            Some(status) if status == U64::zero() => Err(Rejection::Reverted(format!(
                "transaction {txn_hash:?} failed in block {block_number}"
            ))
            .into()),
            _ => Ok(block_number),
        }
    }
}

/// The revert message of a call the node refused to execute
fn revert_reason(err: &web3::contract::Error) -> Option<String> {
    match err {
        web3::contract::Error::Api(web3::Error::Rpc(rpc)) if is_revert(&rpc.message) => {
            Some(rpc.message.clone())
        }
        _ => None,
    }
}

fn is_revert(message: &str) -> bool {
    message.contains("revert")
}
