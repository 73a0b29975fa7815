//! Shared fixtures for the behaviour tests: a scripted courier API and a
//! fully wired order handler over in-memory stores.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use livraria_core::config::option_names;
use livraria_core::{
    ApiClient, CourierConfig, CourierIdCache, CourierTransport, HttpClient, HttpError, HttpMethod,
    HttpRequest, HttpResponse, MemoryOrderSource, MemoryStore, OptionStore, Order, OrderHandler,
    RuntimeEnvironment, TokenManager, UtcDateTime,
};
use serde_json::{json, Value};

pub const BASE_URL: &str = "https://courier.test";

type Reply = Result<HttpResponse, HttpError>;

struct Route {
    method: HttpMethod,
    path: String,
    replies: VecDeque<Reply>,
}

/// Courier API double. Each route answers its scripted replies in order and
/// keeps repeating the last one.
#[derive(Default)]
pub struct ScriptedHttpClient {
    routes: Mutex<Vec<Route>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl ScriptedHttpClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on(&self, method: HttpMethod, path: &str, reply: Reply) -> &Self {
        let mut routes = self.routes.lock().expect("routes");
        match routes
            .iter_mut()
            .find(|route| route.method == method && route.path == path)
        {
            Some(route) => route.replies.push_back(reply),
            None => routes.push(Route {
                method,
                path: path.to_owned(),
                replies: VecDeque::from([reply]),
            }),
        }
        self
    }

    pub fn on_json(&self, method: HttpMethod, path: &str, status: u16, body: Value) -> &Self {
        self.on(method, path, Ok(HttpResponse::new(status, body.to_string())))
    }

    /// Drop any scripted replies for the route and answer with `body` only.
    pub fn replace_json(&self, method: HttpMethod, path: &str, status: u16, body: Value) -> &Self {
        self.routes
            .lock()
            .expect("routes")
            .retain(|route| !(route.method == method && route.path == path));
        self.on_json(method, path, status, body)
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().expect("requests").clone()
    }

    /// Requests sent to `path` (query string ignored).
    pub fn requests_to(&self, method: HttpMethod, path: &str) -> Vec<HttpRequest> {
        self.requests()
            .into_iter()
            .filter(|request| request.method == method && path_of(&request.url) == path)
            .collect()
    }

    pub fn count(&self, method: HttpMethod, path: &str) -> usize {
        self.requests_to(method, path).len()
    }

    /// JSON body of the last request sent to `path`.
    pub fn last_body(&self, method: HttpMethod, path: &str) -> Value {
        let request = self
            .requests_to(method, path)
            .pop()
            .unwrap_or_else(|| panic!("no {method} request to {path}"));
        serde_json::from_str(request.body.as_deref().expect("request body")).expect("json body")
    }

    fn reply(&self, request: &HttpRequest) -> Reply {
        let path = path_of(&request.url);
        let mut routes = self.routes.lock().expect("routes");
        let Some(route) = routes
            .iter_mut()
            .find(|route| route.method == request.method && route.path == path)
        else {
            return Ok(HttpResponse::new(404, r#"{"message":"Not scripted"}"#));
        };

        if route.replies.len() > 1 {
            route.replies.pop_front().expect("reply")
        } else {
            route.replies.front().cloned().expect("reply")
        }
    }
}

impl HttpClient for ScriptedHttpClient {
    fn execute<'a>(
        &'a self,
        request: HttpRequest,
    ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>> {
        Box::pin(async move {
            let reply = self.reply(&request);
            self.requests.lock().expect("requests").push(request);
            reply
        })
    }
}

fn path_of(url: &str) -> String {
    let path = url.strip_prefix(BASE_URL).unwrap_or(url);
    path.split('?').next().unwrap_or(path).to_owned()
}

/// Handler and collaborators over in-memory stores.
pub struct Harness {
    pub http: Arc<ScriptedHttpClient>,
    pub store: Arc<MemoryStore>,
    pub orders: Arc<MemoryOrderSource>,
    pub tokens: Arc<TokenManager>,
    pub api: ApiClient,
    pub handler: Arc<OrderHandler>,
}

impl Harness {
    /// Base URL configured, no session yet.
    pub fn new() -> Self {
        Self::with_base_url(BASE_URL)
    }

    pub fn with_base_url(base_url: &str) -> Self {
        let http = Arc::new(ScriptedHttpClient::new());
        let store = Arc::new(MemoryStore::new());
        let orders = Arc::new(MemoryOrderSource::default());

        let transport = CourierTransport::new(
            http.clone(),
            CourierConfig::new(base_url),
            RuntimeEnvironment::Host,
        );
        let tokens = Arc::new(TokenManager::new(transport, store.clone()));
        let api = ApiClient::new(tokens.clone());
        let couriers = Arc::new(CourierIdCache::new(api.clone(), store.clone()));
        let handler = Arc::new(OrderHandler::new(
            api.clone(),
            couriers,
            orders.clone(),
            store.clone(),
            store.clone(),
        ));

        Self {
            http,
            store,
            orders,
            tokens,
            api,
            handler,
        }
    }

    /// Base URL configured and a token valid for an hour.
    pub fn signed_in() -> Self {
        let harness = Self::new();
        harness.store_token("token-1", 3600);
        harness
    }

    pub fn store_token(&self, token: &str, expires_in_secs: i64) {
        let expires_at = UtcDateTime::now().unix_timestamp() + expires_in_secs;
        self.set_option(option_names::API_TOKEN, token);
        self.set_option(option_names::TOKEN_EXPIRES_AT, &expires_at.to_string());
    }

    pub fn set_option(&self, name: &str, value: &str) {
        self.store.set_option(name, value).expect("set option");
    }

    pub fn add_order(&self, order: Order) {
        self.orders.insert(order);
    }

    /// Script every endpoint of the quote → select → label flow.
    pub fn script_courier_api(&self) {
        self.http
            .on_json(
                HttpMethod::Get,
                "/public/couriers",
                200,
                json!([{"_id": "fan"}, {"_id": "cargus"}]),
            )
            .on_json(
                HttpMethod::Get,
                "/users/me/sender-profile",
                200,
                json!([sender_profile_json()]),
            )
            .on_json(HttpMethod::Post, "/public/awb/quotes", 201, quote_response_json())
            .on_json(
                HttpMethod::Post,
                "/public/awb/quotes/select",
                200,
                json!({"success": true}),
            )
            .on_json(
                HttpMethod::Post,
                "/public/awb/quotes/billing-info",
                200,
                json!({"id": "bill-1"}),
            )
            .on_json(
                HttpMethod::Post,
                "/expedition",
                201,
                json!({"id": "exp-1", "awbNumber": "AWB123", "status": {"name": "Created"}}),
            );
    }
}

pub fn sender_profile_json() -> Value {
    json!({
        "id": "sp-1",
        "name": "Librăria Veche SRL",
        "email": "expeditii@libraria.test",
        "phone": "+40212223344",
        "isCompany": true,
        "codIban": "RO49AAAA1B31007593840000",
        "address": {
            "country": "RO",
            "county": "București",
            "city": "București",
            "postcode": "010011",
            "street": "Strada Lipscani",
            "streetNumber": "12"
        }
    })
}

pub fn quote_response_json() -> Value {
    json!({
        "quoteRequest": {"id": "qr-1"},
        "courierQuotes": [
            {"id": "q-fan", "courierName": "FAN Courier", "amount": 21.5, "currency": "RON", "deliveryDays": 2},
            {"id": "q-locker", "courierName": "Easybox", "amount": 9.9, "currency": "RON", "isLockerQuote": true},
            {"id": "q-cargus", "courierName": "Cargus", "amount": 18.0, "currency": "RON", "deliveryDays": 1}
        ]
    })
}

/// Complete order paid cash on delivery.
pub fn cod_order(id: u64) -> Order {
    serde_json::from_value(json!({
        "id": id,
        "status": "processing",
        "total": 149.99,
        "currency": "RON",
        "payment_method": "cod",
        "payment_method_title": "Cash on delivery",
        "billing": {
            "first_name": "Ioana",
            "last_name": "Popescu",
            "address_1": "Strada Florilor 7",
            "city": "Cluj-Napoca",
            "state": "CJ",
            "postcode": "400001",
            "country": "RO",
            "email": "ioana@example.test",
            "phone": "0722123456"
        },
        "items": [
            {"name": "Amintiri din copilărie", "quantity": 2, "weight": 0.4}
        ]
    }))
    .expect("order fixture")
}

pub fn login_success_json(token: &str) -> Value {
    json!({"success": true, "data": {"accessToken": token, "expiresIn": 3600}})
}
