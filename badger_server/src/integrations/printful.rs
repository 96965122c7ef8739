use badger_engine::traits::{FulfillmentSupplier, SupplierError, SupplierOrder};
use log::*;
use printful_tools::{NewOrder, OrderFile, OrderItem, PrintfulApi, PrintfulApiError, PrintfulConfig, Recipient};

/// [`FulfillmentSupplier`] backed by the Printful orders API.
#[derive(Clone)]
pub struct PrintfulSupplier {
    api: PrintfulApi,
}

impl PrintfulSupplier {
    pub fn new(config: PrintfulConfig) -> Result<Self, PrintfulApiError> {
        let api = PrintfulApi::new(config)?;
        Ok(Self { api })
    }
}

fn supplier_error(e: PrintfulApiError) -> SupplierError {
    match e {
        PrintfulApiError::Timeout(s) => SupplierError::Timeout(s),
        PrintfulApiError::QueryError { status, message } => {
            SupplierError::Rejected(format!("Printful returned {status}. {message}"))
        },
        PrintfulApiError::Initialization(s) | PrintfulApiError::RestRequestError(s) => SupplierError::Unavailable(s),
        // The order may well have been accepted, but we cannot tell which order it is.
        PrintfulApiError::JsonError(s) => SupplierError::Unavailable(format!("Unreadable response. {s}")),
    }
}

/// Translates the engine's order into a Printful order. Printful identifies sync variants by integer id, so a
/// variant id that isn't a number can never be placed.
pub fn printful_order(order: &SupplierOrder, default_country: &str) -> Result<NewOrder, SupplierError> {
    let items = order
        .items
        .iter()
        .map(|item| {
            let variant_id = item.variant_id.trim().parse::<i64>().map_err(|e| {
                SupplierError::Rejected(format!("{} is not a valid Printful variant id. {e}", item.variant_id))
            })?;
            let files = item.file_url.iter().map(|url| OrderFile { url: url.clone() }).collect();
            Ok(OrderItem { variant_id, quantity: item.quantity, files })
        })
        .collect::<Result<Vec<_>, SupplierError>>()?;
    let r = &order.recipient;
    let recipient = Recipient {
        name: r.name.clone(),
        email: r.email.clone(),
        address1: r.address.clone(),
        city: r.city.clone(),
        zip: r.postcode.clone(),
        country_code: r.country_code.clone().unwrap_or_else(|| default_country.to_string()).to_uppercase(),
    };
    Ok(NewOrder { external_id: Some(order.external_id.to_string()), recipient, items })
}

impl FulfillmentSupplier for PrintfulSupplier {
    async fn create_order(&self, order: &SupplierOrder) -> Result<String, SupplierError> {
        let new_order = printful_order(order, &self.api.config().default_country)?;
        trace!("🖨️ Submitting order for {}", order.external_id);
        let placed = self.api.create_order(&new_order).await.map_err(supplier_error)?;
        Ok(placed.id.to_string())
    }
}
