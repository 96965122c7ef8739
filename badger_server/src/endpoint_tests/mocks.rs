use badger_engine::{
    db_types::{FulfillmentRecord, FulfillmentStatus, FulfillmentUpdate, MinorUnits, Reservation, SessionId, SpendRecord},
    traits::{
        CheckoutSessionRequest,
        FulfillmentLedger,
        FulfillmentSupplier,
        LedgerError,
        NewSessionInfo,
        PaymentIntentInfo,
        PaymentProcessor,
        ProcessorError,
        SpendLedger,
        SupplierError,
        SupplierOrder,
        TransferRequest,
    },
};
use chrono::NaiveDate;
use mockall::mock;

mock! {
    pub SpendDb {}
    impl Clone for SpendDb {
        fn clone(&self) -> Self;
    }
    impl SpendLedger for SpendDb {
        async fn fetch_committed(&self, day: NaiveDate) -> Result<MinorUnits, LedgerError>;
        async fn fetch_spend_record(&self, day: NaiveDate) -> Result<Option<SpendRecord>, LedgerError>;
        async fn reserve(&self, day: NaiveDate, delta: MinorUnits, cap: MinorUnits) -> Result<Reservation, LedgerError>;
        async fn release(&self, day: NaiveDate, delta: MinorUnits) -> Result<MinorUnits, LedgerError>;
        async fn reset(&self, day: NaiveDate) -> Result<(), LedgerError>;
    }
}

mock! {
    pub FulfillmentDb {}
    impl Clone for FulfillmentDb {
        fn clone(&self) -> Self;
    }
    impl FulfillmentLedger for FulfillmentDb {
        async fn claim(&self, session_id: &SessionId) -> Result<bool, LedgerError>;
        async fn update(&self, session_id: &SessionId, update: FulfillmentUpdate) -> Result<Option<FulfillmentRecord>, LedgerError>;
        async fn fetch(&self, session_id: &SessionId) -> Result<Option<FulfillmentRecord>, LedgerError>;
        async fn search(&self, status: Option<FulfillmentStatus>) -> Result<Vec<FulfillmentRecord>, LedgerError>;
    }
}

mock! {
    pub Processor {}
    impl Clone for Processor {
        fn clone(&self) -> Self;
    }
    impl PaymentProcessor for Processor {
        async fn create_checkout_session(&self, request: &CheckoutSessionRequest) -> Result<NewSessionInfo, ProcessorError>;
        async fn retrieve_payment_intent(&self, id: &str) -> Result<PaymentIntentInfo, ProcessorError>;
        async fn create_transfer(&self, transfer: &TransferRequest) -> Result<String, ProcessorError>;
    }
}

mock! {
    pub Supplier {}
    impl Clone for Supplier {
        fn clone(&self) -> Self;
    }
    impl FulfillmentSupplier for Supplier {
        async fn create_order(&self, order: &SupplierOrder) -> Result<String, SupplierError>;
    }
}
