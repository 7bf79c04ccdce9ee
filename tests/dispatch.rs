use std::{collections::HashMap, sync::Arc, thread};

use mark_router::{
    Collector, DispatchResult, Dispatcher, ParseError, RouteError, RouteId, RouterConfig,
};
use serde::Deserialize;

fn allowed<'a, T>(res: &DispatchResult<'a, T>) -> Vec<&'a str> {
    match res {
        DispatchResult::MethodNotAllowed { allowed } => allowed.iter().copied().collect(),
        _ => Vec::new(),
    }
}

#[test]
fn static_round_trip() {
    let patterns = ["/", "/about", "/blog/archive", "/a.b/c+d", "/ü/ñ"];

    let mut routes = Collector::new();
    for (idx, pattern) in patterns.iter().enumerate() {
        routes.get(pattern, idx).unwrap();
    }
    let dispatcher = Dispatcher::new(routes.finish());

    for (idx, pattern) in patterns.iter().enumerate() {
        match dispatcher.dispatch("GET", *pattern) {
            DispatchResult::Found { handler, params } => {
                assert_eq!(*handler, idx);
                assert!(params.is_empty());
            }
            res => panic!("{pattern} dispatched to {res:?}"),
        }
    }

    // regex metacharacters in literals are matched literally
    assert_eq!(dispatcher.dispatch("GET", "/aXb/c+d"), DispatchResult::NotFound);
}

#[test]
fn placeholder_extraction() {
    let mut routes = Collector::new();
    routes.get("/users/{id}", "user").unwrap();
    let dispatcher = Dispatcher::new(routes.finish());

    let res = dispatcher.dispatch("GET", "/users/42");
    assert_eq!(res.handler(), Some(&"user"));
    assert_eq!(
        res.params().unwrap().iter().collect::<Vec<_>>(),
        vec![("id", "42")]
    );

    assert_eq!(dispatcher.dispatch("GET", "/users/"), DispatchResult::NotFound);
}

#[test]
fn custom_expressions() {
    let mut routes = Collector::new();
    routes.get(r"/posts/{year:\d{4}}/{slug}", "post").unwrap();
    routes.get("/static/{path:.+}", "file").unwrap();
    routes.get(r"/v{version:(1|2)}/ping", "ping").unwrap();
    let dispatcher = Dispatcher::new(routes.finish());

    let res = dispatcher.dispatch("GET", "/posts/2024/hello-world");
    let params = res.params().unwrap();
    assert_eq!(&params["year"], "2024");
    assert_eq!(&params["slug"], "hello-world");
    assert_eq!(dispatcher.dispatch("GET", "/posts/24/x"), DispatchResult::NotFound);

    let res = dispatcher.dispatch("GET", "/static/css/site.css");
    assert_eq!(res.handler(), Some(&"file"));
    assert_eq!(res.params().unwrap().get("path"), Some("css/site.css"));

    // nested group does not shift the placeholders after it
    let res = dispatcher.dispatch("GET", "/v2/ping");
    assert_eq!(res.handler(), Some(&"ping"));
    assert_eq!(res.params().unwrap().get("version"), Some("2"));
    assert_eq!(dispatcher.dispatch("GET", "/v3/ping"), DispatchResult::NotFound);
}

#[test]
fn method_disambiguation() {
    let mut routes = Collector::new();
    routes.get("/users/{id}", "show").unwrap();
    routes.post("/users/{id}", "update").unwrap();
    let dispatcher = Dispatcher::new(routes.finish());

    let res = dispatcher.dispatch("DELETE", "/users/42");
    assert_eq!(allowed(&res), vec!["GET", "POST"]);

    assert_eq!(dispatcher.dispatch("GET", "/users/42").handler(), Some(&"show"));
    assert_eq!(dispatcher.dispatch("POST", "/users/42").handler(), Some(&"update"));
}

#[test]
fn static_precedence() {
    let mut routes = Collector::new();
    routes.get("/users/{id}", "by_id").unwrap();
    routes.get("/users/me", "me").unwrap();
    let dispatcher = Dispatcher::new(routes.finish());

    assert_eq!(dispatcher.dispatch("GET", "/users/me").handler(), Some(&"me"));
    assert_eq!(dispatcher.dispatch("GET", "/users/42").handler(), Some(&"by_id"));
}

#[test]
fn registration_order_among_variable_routes() {
    let mut routes = Collector::new();
    routes.get("/files/{name}", "any").unwrap();
    routes.get(r"/files/{id:\d+}", "numeric").unwrap();
    let dispatcher = Dispatcher::new(routes.finish());

    assert_eq!(dispatcher.dispatch("GET", "/files/12").handler(), Some(&"any"));
}

#[test]
fn batch_transparency() {
    const ROUTES: usize = 200;

    let build = |max_groups| {
        let mut routes =
            Collector::with_config(RouterConfig::default().max_groups_per_batch(max_groups));

        for i in 0..ROUTES {
            routes.get(&format!("/r{i}/{{a}}"), i).unwrap();
            if i % 3 == 0 {
                routes.post(&format!("/r{i}/{{a}}/{{b}}"), i + ROUTES).unwrap();
            }
        }

        routes.finish()
    };

    let small = build(4);
    let large = build(1024);
    assert!(small.variable_route_map().len() > 1);
    assert_eq!(large.variable_route_map().len(), 1);

    for map in [small, large] {
        let dispatcher = Dispatcher::new(map);

        for i in 0..ROUTES {
            let path = format!("/r{i}/x");
            let res = dispatcher.dispatch("GET", path.as_str());
            assert_eq!(res.handler(), Some(&i), "{path}");
            assert_eq!(res.params().unwrap().get("a"), Some("x"));

            let path = format!("/r{i}/x/y");
            let res = dispatcher.dispatch("POST", path.as_str());
            if i % 3 == 0 {
                assert_eq!(res.handler(), Some(&(i + ROUTES)), "{path}");
                assert_eq!(res.params().unwrap().get("b"), Some("y"));
            } else {
                assert_eq!(res, DispatchResult::NotFound, "{path}");
            }
        }

        let res = dispatcher.dispatch("PUT", "/r0/x");
        assert_eq!(allowed(&res), vec!["GET"]);
    }
}

#[test]
fn other_methods_across_batch_boundaries() {
    let mut routes = Collector::with_config(RouterConfig::default().max_groups_per_batch(2));
    routes.get(r"/items/{id:\d+}", "get_numeric").unwrap();
    routes.post("/items/{name}", "post_any").unwrap();
    routes.delete("/items/{name}", "delete_any").unwrap();
    let routes = routes.finish();
    assert_eq!(routes.variable_route_map().len(), 3);

    let dispatcher = Dispatcher::new(routes);

    assert_eq!(dispatcher.dispatch("POST", "/items/7").handler(), Some(&"post_any"));
    assert_eq!(dispatcher.dispatch("DELETE", "/items/7").handler(), Some(&"delete_any"));
    assert_eq!(
        allowed(&dispatcher.dispatch("PUT", "/items/7")),
        vec!["DELETE", "GET", "POST"]
    );
}

#[test]
fn earlier_route_wins_for_its_method() {
    let build = |max_groups| {
        let mut routes =
            Collector::with_config(RouterConfig::default().max_groups_per_batch(max_groups));
        routes.post("/x/{a}", "post_any").unwrap();
        routes.get(r"/x/{id:\d+}", "get_numeric").unwrap();
        routes.get("/x/{a}", "get_any").unwrap();
        Dispatcher::new(routes.finish())
    };

    for dispatcher in [build(2), build(32)] {
        assert_eq!(dispatcher.dispatch("GET", "/x/5").handler(), Some(&"get_numeric"));
        assert_eq!(dispatcher.dispatch("GET", "/x/five").handler(), Some(&"get_any"));
    }
}

#[test]
fn named_groups_rejected_at_any_ceiling() {
    for max_groups in [3, 32] {
        let mut routes =
            Collector::with_config(RouterConfig::default().max_groups_per_batch(max_groups));

        for pattern in [r"/a/{v:(?P<n>\d+)}", r"/b/{v:(?P<n>\d+)}"] {
            assert!(matches!(
                routes.get(pattern, ()),
                Err(RouteError::Parse(ParseError::InvalidExpression { .. }))
            ));
        }

        routes.get(r"/a/{v:(\d+)}", ()).unwrap();
        routes.get(r"/b/{v:(\d+)}", ()).unwrap();
    }
}

#[test]
fn duplicate_rejection() {
    let mut routes = Collector::new();
    routes.get("/a", "first").unwrap();
    routes.get("/b/{id}", "first").unwrap();

    assert_eq!(
        routes.get("/a", "second"),
        Err(RouteError::DuplicateRoute {
            method: "GET".to_owned(),
            pattern: "/a".to_owned()
        })
    );
    assert!(matches!(
        routes.get("/b/{other}", "second"),
        Err(RouteError::DuplicateRoute { .. })
    ));

    let dispatcher = Dispatcher::new(routes.finish());
    assert_eq!(dispatcher.dispatch("GET", "/a").handler(), Some(&"first"));
    assert_eq!(dispatcher.dispatch("GET", "/b/1").handler(), Some(&"first"));
    assert_eq!(dispatcher.routes().len(), 2);
}

#[test]
fn empty_router() {
    let dispatcher = Dispatcher::new(Collector::<()>::new().finish());
    assert!(dispatcher.routes().is_empty());
    assert_eq!(dispatcher.dispatch("GET", "/anything"), DispatchResult::NotFound);
}

#[test]
fn determinism() {
    let build = || {
        let mut routes = Collector::with_config(RouterConfig::default().max_groups_per_batch(6));
        routes.get("/", 0).unwrap();
        routes.get("/a/{x}", 1).unwrap();
        routes.get(r"/a/{x:\d+}/{y}", 2).unwrap();
        routes.post("/a/{x}", 3).unwrap();
        routes.get("/b/{x}/{y}/{z}", 4).unwrap();
        routes.put("/c/{x}", 5).unwrap();
        Dispatcher::new(routes.finish())
    };

    let (first, second) = (build(), build());

    let requests = [
        ("GET", "/"),
        ("GET", "/a/1"),
        ("POST", "/a/1"),
        ("GET", "/a/1/2"),
        ("DELETE", "/a/1"),
        ("GET", "/b/1/2/3"),
        ("GET", "/c/1"),
        ("GET", "/nope"),
    ];

    for (method, path) in requests {
        assert_eq!(first.dispatch(method, path), second.dispatch(method, path));
    }

    let regexes = |d: &Dispatcher<i32>| {
        d.routes()
            .variable_route_map()
            .iter()
            .map(|batch| batch.regex().to_owned())
            .collect::<Vec<_>>()
    };
    assert_eq!(regexes(&first), regexes(&second));
}

#[test]
fn typed_params() {
    #[derive(Debug, Deserialize, PartialEq)]
    struct Commit<'a> {
        owner: &'a str,
        repo: String,
        sha: u64,
    }

    let mut routes = Collector::new();
    routes
        .get(r"/repos/{owner}/{repo}/commits/{sha:\d+}", ())
        .unwrap();
    let dispatcher = Dispatcher::new(routes.finish());

    let res = dispatcher.dispatch("GET", "/repos/rust-lang/regex/commits/1234");
    let commit: Commit<'_> = res.params().unwrap().load().unwrap();
    assert_eq!(
        commit,
        Commit {
            owner: "rust-lang",
            repo: "regex".to_owned(),
            sha: 1234,
        }
    );

    let (owner, repo, sha): (String, String, u64) = res.params().unwrap().load().unwrap();
    assert_eq!((owner.as_str(), repo.as_str(), sha), ("rust-lang", "regex", 1234));
}

#[test]
fn named_routes_and_groups() {
    let mut routes = Collector::new();
    routes
        .group("/api", |api| {
            api.add_named_route(["GET", "HEAD"], "/repos/{owner}/{repo}", "repo", "repo")?;
            api.group("/admin", |admin| {
                admin.add_named_route("POST", "/flush", "flush", "flush")?;
                Ok(())
            })
        })
        .unwrap();
    let routes = routes.finish();

    assert_eq!(routes.named("repo"), Some(RouteId(0)));
    assert_eq!(routes.handler(RouteId(1)), Some(&"flush"));

    let mut values = HashMap::new();
    values.insert("owner".to_owned(), "rust-lang".to_owned());
    values.insert("repo".to_owned(), "rust".to_owned());
    assert_eq!(routes.url_for("repo", &values).unwrap(), "/api/repos/rust-lang/rust");
    assert_eq!(
        routes.url_for_iter("flush", std::iter::empty::<&str>()).unwrap(),
        "/api/admin/flush"
    );

    let dispatcher = Dispatcher::new(routes);
    assert_eq!(
        dispatcher.dispatch("HEAD", "/api/repos/a/b").handler(),
        Some(&"repo")
    );
    assert_eq!(allowed(&dispatcher.dispatch("GET", "/api/admin/flush")), vec!["POST"]);
}

#[test]
fn shared_across_threads() {
    let mut routes = Collector::new();
    routes.get("/jobs/{id}", "job").unwrap();
    let dispatcher = Arc::new(Dispatcher::new(routes.finish()));

    let handles = (0..4)
        .map(|n| {
            let dispatcher = Arc::clone(&dispatcher);
            thread::spawn(move || {
                let path = format!("/jobs/{n}");
                let res = dispatcher.dispatch("GET", path.as_str());
                res.params().unwrap().get("id").map(str::to_owned)
            })
        })
        .collect::<Vec<_>>();

    for (n, handle) in handles.into_iter().enumerate() {
        assert_eq!(handle.join().unwrap(), Some(n.to_string()));
    }
}
