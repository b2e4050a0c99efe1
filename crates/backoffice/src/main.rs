//! Headless back-office check: loads every collection once and reports
//! what came back.

use anyhow::Result;
use grocerdesk_auth::{Role, Session};
use grocerdesk_backoffice::domain::{
    CarouselSlide, Category, ComboOffer, Coupon, Customer, Deal, DeliveryFee, HomeSection,
    Notification, Order, Product, SubAdmin,
};
use grocerdesk_backoffice::{BackOffice, BackOfficeConfig};
use grocerdesk_client::Collection;

#[tokio::main]
async fn main() -> Result<()> {
    let config = BackOfficeConfig::from_env()?;
    let office = BackOffice::bootstrap(config)?;

    match std::env::var("GROCERDESK_TOKEN") {
        Ok(token) => {
            tracing::info!("signing in with GROCERDESK_TOKEN");
            office.login(Session::new(token, Role::admin()));
        }
        Err(_) => tracing::warn!("GROCERDESK_TOKEN not set; protected collections will be rejected"),
    }

    let mut failures = 0;
    failures += report::<Category>(&office).await;
    failures += report::<Product>(&office).await;
    failures += report::<Coupon>(&office).await;
    failures += report::<Order>(&office).await;
    failures += report::<Customer>(&office).await;
    failures += report::<Notification>(&office).await;
    failures += report::<SubAdmin>(&office).await;
    failures += report::<DeliveryFee>(&office).await;
    failures += report::<ComboOffer>(&office).await;
    failures += report::<Deal>(&office).await;
    failures += report::<HomeSection>(&office).await;
    failures += report::<CarouselSlide>(&office).await;

    if failures > 0 {
        anyhow::bail!("{failures} collection(s) failed to load");
    }
    Ok(())
}

async fn report<T: Collection>(office: &BackOffice) -> usize {
    let mut page = office.controller::<T>();
    match page.mount().await {
        Ok(()) => {
            println!("{:<16} {:>6}", T::BASE_PATH, page.items().len());
            0
        }
        Err(err) => {
            println!("{:<16} {}", T::BASE_PATH, err.user_message());
            1
        }
    }
}
