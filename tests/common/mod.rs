use std::cell::RefCell;
use std::ops::DerefMut;
use std::rc::Rc;
use std::sync::Mutex;

use actix_http::cookie::CookieJar;
use actix_http::Request;
use actix_identity::{CookieIdentityPolicy, IdentityService};
use actix_web::{App, test};
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::{header, StatusCode};
use diesel::prelude::*;
use futures::executor::block_on;
use rand::Rng;

use milk_ledger_server::*;
use milk_ledger_server::models::IdType;

lazy_static! {
    static ref MIGRATION_SETUP: Mutex<()> = Mutex::new(());
}

#[derive(Debug)]
pub struct PageResponse {
    pub status: StatusCode,
    pub location: Option<String>,
    pub body: String,
}

impl PageResponse {
    pub fn expect_redirect(&self, location: &str) {
        assert_eq!(self.status, StatusCode::FOUND, "expected a redirect, body: {}", self.body);
        assert_eq!(self.location.as_ref().map(String::as_str), Some(location));
    }

    pub fn expect_redirect_prefix(&self, prefix: &str) {
        assert_eq!(self.status, StatusCode::FOUND, "expected a redirect, body: {}", self.body);
        let location = self.location.as_ref().expect("redirect without Location");
        assert!(location.starts_with(prefix), "unexpected redirect target: {}", location);
    }
}

pub fn create_random_token() -> String {
    let data = rand::thread_rng().gen::<[u8; 8]>();
    hex::encode(&data)
}

pub trait WebTester {
    fn app_data(&self) -> AppData;

    /// New tester sharing the app but with its own (empty) cookie jar.
    fn fork(&self) -> Box<dyn WebTester>;

    fn exec(&mut self, req: Request) -> PageResponse;

    fn get(&mut self, path: &str) -> PageResponse;

    fn post_form(&mut self, path: &str, form: &[(&str, &str)]) -> PageResponse;

    fn register(&mut self, name: &str, email: &str, password: &str, role: &str) -> PageResponse {
        self.post_form("/register", &[
            ("name", name),
            ("email", email),
            ("password", password),
            ("role", role),
        ])
    }

    fn login(&mut self, email: &str, password: &str) -> PageResponse {
        self.post_form("/login", &[("email", email), ("password", password)])
    }

    /// Registers an account with a random name/email and returns (id, email, name).
    fn create_random_user(&mut self, password: &str, role: &str) -> (IdType, String, String) {
        use milk_ledger_server::schema::users::dsl;

        let token = create_random_token();
        let email = format!("{}@test.local", token);
        let name = format!("user-{}", token);

        self.register(name.as_str(), email.as_str(), password, role)
            .expect_redirect_prefix("/login");

        let data = self.app_data();
        let conn = data.pool.get().unwrap();
        let id = dsl::users
            .filter(dsl::email.eq(email.as_str()))
            .select(dsl::id)
            .first::<IdType>(&conn)
            .unwrap();

        (id, email, name)
    }

    /// Fresh session with a random logged-in account of the given role.
    fn login_random_user(&mut self, role: &str) -> (IdType, String, String) {
        let user = self.create_random_user("secret-pass", role);
        self.login(user.1.as_str(), "secret-pass").expect_redirect_prefix("/?notice=");
        user
    }
}

pub struct WebTesterImpl<S, B, E>
    where S: Service<Request = actix_http::Request, Response = ServiceResponse<B>, Error = E> + 'static,
          B: actix_http::body::MessageBody + 'static,
          E: std::fmt::Debug + 'static,
{
    pub service: Rc<RefCell<S>>,
    pub data: AppData,
    pub cookies: CookieJar,
}

impl<S, B, E> WebTester for WebTesterImpl<S, B, E>
    where S: Service<Request = actix_http::Request, Response = ServiceResponse<B>, Error = E> + 'static,
          B: actix_http::body::MessageBody + 'static,
          E: std::fmt::Debug + 'static,
{
    fn app_data(&self) -> AppData {
        self.data.clone()
    }

    fn fork(&self) -> Box<dyn WebTester> {
        Box::new(WebTesterImpl {
            service: self.service.clone(),
            data: self.data.clone(),
            cookies: CookieJar::new(),
        })
    }

    fn exec(&mut self, req: Request) -> PageResponse {
        let mut service = self.service.borrow_mut();
        let result = block_on(test::call_service(service.deref_mut(), req));
        for cookie in result.response().cookies() {
            self.cookies.add(cookie.into_owned())
        }
        let status = result.status();
        let location = result.headers().get(header::LOCATION)
            .map(|x| x.to_str().unwrap().to_string());
        let body = block_on(test::read_body(result));
        PageResponse {
            status,
            location,
            body: String::from_utf8_lossy(body.as_ref()).to_string(),
        }
    }

    fn get(&mut self, path: &str) -> PageResponse {
        let mut partial = test::TestRequest::get().uri(path);
        for cookie in self.cookies.iter() {
            partial = partial.cookie(cookie.clone());
        }
        let req = partial.to_request();
        self.exec(req)
    }

    fn post_form(&mut self, path: &str, form: &[(&str, &str)]) -> PageResponse {
        let payload = serde_urlencoded::to_string(form).unwrap();
        let mut partial = test::TestRequest::post()
            .uri(path)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .set_payload(payload);
        for cookie in self.cookies.iter() {
            partial = partial.cookie(cookie.clone());
        }
        let req = partial.to_request();
        self.exec(req)
    }
}

/// Returns None when no test database is configured, callers skip the test.
pub fn init_app() -> Option<(Box<dyn WebTester>, AppData)> {
    dotenv::dotenv().ok();
    let database_url = match std::env::var("TEST_DATABASE_URL") {
        Ok(x) => x,
        Err(_) => {
            eprintln!("TEST_DATABASE_URL not set, skipping database test");
            return None;
        },
    };
    let data = AppData::new("a".repeat(32), database_url);

    {
        let _guard = MIGRATION_SETUP.lock().unwrap();
        data.setup_migrations().unwrap();
    }

    let service = block_on(test::init_service(
        App::new()
            .data(data.clone())
            .wrap(IdentityService::new(
                CookieIdentityPolicy::new(&[41; 32])
                    .name("auth-cookie")
                    .secure(false)))
            .configure(api_service::config)
    ));

    let tester = WebTesterImpl {
        service: Rc::new(RefCell::new(service)),
        data: data.clone(),
        cookies: CookieJar::new(),
    };
    Some((Box::new(tester), data))
}
