//! In-memory stand-ins for the payment processor and the supplier.
use std::{
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
        Mutex,
    },
    time::Duration,
};

use badger_engine::{
    db_types::{MinorUnits, SessionId},
    traits::{
        CheckoutSessionRequest,
        FulfillmentSupplier,
        NewSessionInfo,
        PaymentIntentInfo,
        PaymentProcessor,
        ProcessorError,
        SupplierError,
        SupplierOrder,
        TransferRequest,
    },
};

#[derive(Clone, Default)]
pub struct FakeProcessor {
    fail_sessions: bool,
    fail_transfers: bool,
    delay: Option<Duration>,
    amount_received: i64,
    sessions: Arc<Mutex<Vec<CheckoutSessionRequest>>>,
    transfers: Arc<Mutex<Vec<TransferRequest>>>,
}

impl FakeProcessor {
    pub fn new() -> Self {
        Self { amount_received: 3900, ..Default::default() }
    }

    pub fn failing() -> Self {
        Self { fail_sessions: true, ..Self::new() }
    }

    pub fn with_failing_transfers(mut self) -> Self {
        self.fail_transfers = true;
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn sessions(&self) -> Vec<CheckoutSessionRequest> {
        self.sessions.lock().unwrap().clone()
    }

    pub fn transfers(&self) -> Vec<TransferRequest> {
        self.transfers.lock().unwrap().clone()
    }
}

impl PaymentProcessor for FakeProcessor {
    async fn create_checkout_session(
        &self,
        request: &CheckoutSessionRequest,
    ) -> Result<NewSessionInfo, ProcessorError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail_sessions {
            return Err(ProcessorError::Unavailable("connection reset by peer".into()));
        }
        let mut sessions = self.sessions.lock().unwrap();
        sessions.push(request.clone());
        let id = format!("cs_test_{}", sessions.len());
        Ok(NewSessionInfo { url: format!("https://checkout.example.com/pay/{id}"), session_id: SessionId(id) })
    }

    async fn retrieve_payment_intent(&self, id: &str) -> Result<PaymentIntentInfo, ProcessorError> {
        Ok(PaymentIntentInfo {
            id: id.to_string(),
            amount_received: MinorUnits::from(self.amount_received),
            currency: "gbp".into(),
        })
    }

    async fn create_transfer(&self, transfer: &TransferRequest) -> Result<String, ProcessorError> {
        if self.fail_transfers {
            return Err(ProcessorError::Rejected("insufficient available balance".into()));
        }
        let mut transfers = self.transfers.lock().unwrap();
        transfers.push(transfer.clone());
        Ok(format!("tr_{}", transfers.len()))
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SupplierBehaviour {
    #[default]
    Accept,
    TimeOut,
    Reject,
}

#[derive(Clone, Default)]
pub struct FakeSupplier {
    behaviour: SupplierBehaviour,
    delay: Option<Duration>,
    calls: Arc<AtomicUsize>,
    orders: Arc<Mutex<Vec<SupplierOrder>>>,
}

impl FakeSupplier {
    pub fn new(behaviour: SupplierBehaviour) -> Self {
        Self { behaviour, ..Default::default() }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn orders(&self) -> Vec<SupplierOrder> {
        self.orders.lock().unwrap().clone()
    }
}

impl FulfillmentSupplier for FakeSupplier {
    async fn create_order(&self, order: &SupplierOrder) -> Result<String, SupplierError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.orders.lock().unwrap().push(order.clone());
        match self.behaviour {
            SupplierBehaviour::Accept => Ok(format!("{}", 90_000 + n)),
            SupplierBehaviour::TimeOut => Err(SupplierError::Timeout("operation timed out after 5s".into())),
            SupplierBehaviour::Reject => Err(SupplierError::Rejected("Item 0: Invalid variant".into())),
        }
    }
}
