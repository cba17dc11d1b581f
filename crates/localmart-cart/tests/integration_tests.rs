// Integration tests for the cart crate.
//
// These exercise the public API end to end: the cart manager backed by the
// SQLite store, restore across "page reloads", the storefront pricing rules,
// and checkout against a local HTTP stand-in for the order service.

use std::time::Duration;

use localmart_cart::cart::item::{CartRestaurant, MenuItem};
use localmart_cart::cart::totals::Pricing;
use localmart_cart::confirm::AutoConfirm;
use localmart_cart::order::{checkout, DeliveryDetails, HttpOrderService, OrderError};
use localmart_cart::store::{CartStore, SqliteStore};
use localmart_cart::{AddOutcome, CartError, CartManager};

use rust_decimal::Decimal;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

// ===========================================================================
// Test helpers
// ===========================================================================

const CART_KEY: &str = "localmart_cart";

fn spice_garden() -> CartRestaurant {
    CartRestaurant::new("r1", "Spice Garden")
}

fn dosa_plaza() -> CartRestaurant {
    CartRestaurant::new("r2", "Dosa Plaza")
}

fn paneer() -> MenuItem {
    MenuItem::new("m1", "Paneer Butter Masala", Decimal::new(180, 0)).vegetarian()
}

fn open_manager(path: &str, answer: bool) -> CartManager<SqliteStore, AutoConfirm> {
    let store = SqliteStore::open(path).expect("store should open");
    CartManager::restore(store, AutoConfirm(answer), Pricing::default(), CART_KEY)
}

fn scratch_db(name: &str) -> (std::path::PathBuf, String) {
    let dir = std::env::temp_dir().join(name);
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("cart.db").to_str().unwrap().to_string();
    (dir, path)
}

fn details() -> DeliveryDetails {
    DeliveryDetails {
        customer_name: "Asha Rao".into(),
        phone: "+91 98450 00000".into(),
        address: "12 MG Road, Bengaluru".into(),
        instructions: Some("Leave at the gate".into()),
    }
}

/// Accept one HTTP request on a local port, answer it with `status_line` and
/// `body`, and hand back the raw request text.
async fn serve_once(status_line: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let request = read_request(&mut socket).await;
        let response = format!(
            "HTTP/1.1 {status_line}\r\n\
             Content-Type: application/json\r\n\
             Content-Length: {}\r\n\
             Connection: close\r\n\r\n{body}",
            body.len()
        );
        socket.write_all(response.as_bytes()).await.unwrap();
        let _ = socket.shutdown().await;
        request
    });

    (format!("http://{addr}/api"), handle)
}

/// Read a full HTTP/1.1 request (headers plus Content-Length body).
async fn read_request(socket: &mut TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    loop {
        let n = socket.read(&mut chunk).await.unwrap();
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);

        if let Some(end) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            let headers = String::from_utf8_lossy(&buf[..end]).to_lowercase();
            let content_length = headers
                .lines()
                .find_map(|line| line.strip_prefix("content-length:"))
                .and_then(|v| v.trim().parse::<usize>().ok())
                .unwrap_or(0);
            if buf.len() >= end + 4 + content_length {
                break;
            }
        }
    }
    String::from_utf8_lossy(&buf).into_owned()
}

fn request_body(raw: &str) -> serde_json::Value {
    let (_, body) = raw.split_once("\r\n\r\n").expect("request has a body");
    serde_json::from_str(body).expect("request body is JSON")
}

// ===========================================================================
// Cart scenarios
// ===========================================================================

#[tokio::test]
async fn scenario_first_item_binds_restaurant() {
    let mut cart = open_manager(":memory:", true);
    cart.add_item(paneer(), Some(spice_garden())).await.unwrap();

    assert_eq!(cart.items().len(), 1);
    assert_eq!(cart.quantity_of("m1"), 1);
    assert_eq!(cart.restaurant().map(|r| r.id.as_str()), Some("r1"));
}

#[tokio::test]
async fn scenario_repeat_add_doubles_quantity_and_subtotal() {
    let mut cart = open_manager(":memory:", true);
    cart.add_item(paneer(), Some(spice_garden())).await.unwrap();
    cart.add_item(paneer(), Some(spice_garden())).await.unwrap();

    assert_eq!(cart.quantity_of("m1"), 2);
    assert_eq!(cart.totals().subtotal, Decimal::new(360, 0));
}

#[tokio::test]
async fn scenario_remove_down_to_empty() {
    let mut cart = open_manager(":memory:", true);
    cart.add_item(paneer(), Some(spice_garden())).await.unwrap();
    cart.add_item(paneer(), Some(spice_garden())).await.unwrap();

    cart.remove_item("m1");
    assert_eq!(cart.quantity_of("m1"), 1);
    cart.remove_item("m1");
    assert!(cart.is_empty());
    assert!(cart.restaurant().is_none());
}

#[tokio::test]
async fn scenario_confirmed_switch() {
    let mut cart = open_manager(":memory:", true);
    cart.add_item(paneer(), Some(spice_garden())).await.unwrap();
    cart.add_item(MenuItem::new("m2", "Naan", Decimal::new(40, 0)), None)
        .await
        .unwrap();

    let dosa = MenuItem::new("x1", "Ghee Roast Dosa", Decimal::new(120, 0));
    cart.add_item(dosa, Some(dosa_plaza())).await.unwrap();

    let ids: Vec<&str> = cart.items().iter().map(|i| i.id.as_str()).collect();
    assert_eq!(ids, vec!["x1"]);
    assert_eq!(cart.restaurant(), Some(&dosa_plaza()));
}

#[tokio::test]
async fn scenario_declined_switch_is_noop() {
    let (dir, path) = scratch_db("localmart_it_declined");
    let mut cart = open_manager(&path, false);
    cart.add_item(paneer(), Some(spice_garden())).await.unwrap();
    let before = cart.cart().clone();

    let reader = SqliteStore::open(&path).unwrap();
    let stored_before = reader.load(CART_KEY).unwrap();
    assert!(stored_before.is_some());

    let dosa = MenuItem::new("x1", "Ghee Roast Dosa", Decimal::new(120, 0));
    let outcome = cart.add_item(dosa, Some(dosa_plaza())).await.unwrap();

    assert_eq!(outcome, AddOutcome::SwitchDeclined);
    assert_eq!(cart.cart(), &before);
    assert_eq!(reader.load(CART_KEY).unwrap(), stored_before);

    drop(cart);
    drop(reader);
    let _ = std::fs::remove_dir_all(&dir);
}

#[tokio::test]
async fn scenario_totals_with_fee_and_tax() {
    let mut cart = open_manager(":memory:", true);
    cart.add_item(paneer(), Some(spice_garden())).await.unwrap();
    cart.add_item(paneer(), None).await.unwrap();

    let totals = cart.totals();
    assert_eq!(totals.subtotal, Decimal::new(360, 0));
    assert_eq!(totals.delivery_fee, Decimal::new(40, 0));
    assert_eq!(totals.taxes, Decimal::new(1800, 2));
    assert_eq!(totals.total, Decimal::new(41800, 2));
    assert_eq!(cart.pricing().format(totals.total), "₹418.00");
}

#[tokio::test]
async fn add_to_empty_cart_without_restaurant_fails() {
    let mut cart = open_manager(":memory:", true);
    let err = cart.add_item(paneer(), None).await.unwrap_err();
    assert!(matches!(err, CartError::MissingRestaurant { .. }));
    assert!(cart.is_empty());
}

// ===========================================================================
// Restore across reloads
// ===========================================================================

#[tokio::test]
async fn cart_survives_reload() {
    let (dir, path) = scratch_db("localmart_it_reload");

    {
        let mut cart = open_manager(&path, true);
        cart.add_item(paneer(), Some(spice_garden())).await.unwrap();
        cart.add_item(paneer(), None).await.unwrap();
        cart.add_item(MenuItem::new("m2", "Naan", Decimal::new(40, 0)), None)
            .await
            .unwrap();
    }

    let reloaded = open_manager(&path, true);
    assert_eq!(reloaded.restaurant(), Some(&spice_garden()));
    assert_eq!(reloaded.quantity_of("m1"), 2);
    assert_eq!(reloaded.quantity_of("m2"), 1);
    assert!(reloaded.items()[0].is_vegetarian);

    drop(reloaded);
    let _ = std::fs::remove_dir_all(&dir);
}

#[tokio::test]
async fn corrupt_saved_cart_starts_empty() {
    let (dir, path) = scratch_db("localmart_it_corrupt");
    {
        let store = SqliteStore::open(&path).unwrap();
        store.save(CART_KEY, "[{\"id\": 42}]").unwrap();
    }

    let mut cart = open_manager(&path, true);
    assert!(cart.is_empty());
    assert!(cart.restaurant().is_none());

    // The next mutation overwrites the bad blob.
    cart.add_item(paneer(), Some(spice_garden())).await.unwrap();
    drop(cart);
    let reloaded = open_manager(&path, true);
    assert_eq!(reloaded.quantity_of("m1"), 1);

    drop(reloaded);
    let _ = std::fs::remove_dir_all(&dir);
}

// ===========================================================================
// Checkout over HTTP
// ===========================================================================

#[tokio::test]
async fn http_checkout_posts_order_and_clears_cart() {
    let (base_url, server) = serve_once(
        "201 Created",
        r#"{"orderId":"ord_77","status":"confirmed","estimatedDeliveryMinutes":30}"#,
    )
    .await;
    let service = HttpOrderService::new(base_url, Duration::from_secs(5)).unwrap();

    let mut cart = open_manager(":memory:", true);
    cart.add_item(paneer(), Some(spice_garden())).await.unwrap();
    cart.add_item(paneer(), None).await.unwrap();

    let confirmation = checkout(&mut cart, &service, details()).await.unwrap();
    assert_eq!(confirmation.order_id, "ord_77");
    assert_eq!(confirmation.status, "confirmed");
    assert_eq!(confirmation.estimated_delivery_minutes, Some(30));
    assert!(cart.is_empty());

    let raw = server.await.unwrap();
    assert!(raw.starts_with("POST /api/orders "), "request line: {raw}");
    let body = request_body(&raw);
    assert_eq!(body["restaurantId"], "r1");
    assert_eq!(body["restaurantName"], "Spice Garden");
    assert_eq!(body["items"][0]["quantity"], 2);
    assert_eq!(body["customerName"], "Asha Rao");
    assert_eq!(body["instructions"], "Leave at the gate");
}

#[tokio::test]
async fn http_checkout_rejection_keeps_cart() {
    let (base_url, server) =
        serve_once("422 Unprocessable Entity", r#"{"error":"address out of range"}"#).await;
    let service = HttpOrderService::new(base_url, Duration::from_secs(5)).unwrap();

    let mut cart = open_manager(":memory:", true);
    cart.add_item(paneer(), Some(spice_garden())).await.unwrap();

    let err = checkout(&mut cart, &service, details()).await.unwrap_err();
    match err {
        OrderError::Rejected { status, message } => {
            assert_eq!(status, 422);
            assert!(message.contains("address out of range"));
        }
        other => panic!("expected Rejected, got: {other:?}"),
    }
    assert_eq!(cart.quantity_of("m1"), 1);

    server.await.unwrap();
}

#[tokio::test]
async fn http_checkout_unreachable_service_keeps_cart() {
    // Bind then drop to get a port nobody listens on.
    let port = {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        listener.local_addr().unwrap().port()
    };
    let service =
        HttpOrderService::new(format!("http://127.0.0.1:{port}/api"), Duration::from_secs(2))
            .unwrap();

    let mut cart = open_manager(":memory:", true);
    cart.add_item(paneer(), Some(spice_garden())).await.unwrap();

    let err = checkout(&mut cart, &service, details()).await.unwrap_err();
    assert!(matches!(err, OrderError::Http(_)));
    assert!(!cart.is_empty());
}
