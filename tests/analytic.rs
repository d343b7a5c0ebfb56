use queue_model::{
    AnalyticInput, Model, QueueError, solve,
    analytic::{ProcessSpec, Quantity, Spread, TimeUnit},
};

fn close(a: f64, b: f64, tol: f64) -> bool {
    (a - b).abs() <= tol
}

fn per_minute(rate: f64) -> ProcessSpec {
    ProcessSpec::markovian(Quantity::rate(rate, TimeUnit::Minute))
}

fn general_mean(mean: f64, std_dev: f64) -> ProcessSpec {
    ProcessSpec::General {
        quantity: Quantity::mean(mean, TimeUnit::Minute),
        spread: Spread::StdDev(std_dev),
    }
}

/// An input every model accepts, with offered load `rho` on `servers`.
fn input_for(model: Model, rho: f64, servers: u32) -> AnalyticInput {
    let s = if model.is_multi_server() { servers } else { 1 };
    let mu = 2.0;
    let lambda = rho * f64::from(s) * mu;

    let arrival = if model.has_markovian_arrivals() {
        per_minute(lambda)
    } else {
        general_mean(1.0 / lambda, 0.7 / lambda)
    };
    let service = if model.has_markovian_service() {
        per_minute(mu)
    } else {
        general_mean(1.0 / mu, 0.3)
    };

    AnalyticInput {
        model,
        arrival,
        service,
        servers,
    }
}

#[test]
fn littles_law_holds_for_every_model() {
    for model in Model::ALL {
        for rho in [0.1, 0.35, 0.6, 0.85, 0.97] {
            for servers in [1, 2, 5] {
                let input = input_for(model, rho, servers);
                let m = solve(&input).unwrap_or_else(|e| panic!("{model} ρ={rho}: {e}"));
                let lambda = input.arrival.moments().rate;

                assert!(close(m.rho, rho, 1e-9), "{model}: ρ {} != {rho}", m.rho);
                assert!(close(m.l, lambda * m.w, 1e-9), "{model}: L != λW");
                assert!(close(m.lq, lambda * m.wq, 1e-9), "{model}: Lq != λWq");
                assert!(m.w >= m.wq && m.l >= m.lq);
                assert!(m.lq >= 0.0 && m.p0 > 0.0 && m.p0 <= 1.0);
            }
        }
    }
}

#[test]
fn single_server_example() {
    let m = solve(&AnalyticInput {
        model: Model::MM1,
        arrival: per_minute(2.0),
        service: per_minute(3.0),
        servers: 1,
    })
    .unwrap();

    assert_eq!(m.model, Model::MM1);
    assert!(close(m.rho, 0.6667, 1e-4));
    assert!(close(m.l, 2.0, 1e-9));
    assert!(close(m.lq, 1.3333, 1e-4));
    assert!(close(m.w, 1.0, 1e-9));
    assert!(close(m.wq, 0.6667, 1e-4));
}

#[test]
fn multi_server_example() {
    let m = solve(&AnalyticInput {
        model: Model::MMs,
        arrival: per_minute(5.0),
        service: per_minute(2.0),
        servers: 3,
    })
    .unwrap();

    assert!(close(m.rho, 0.8333, 1e-4));
    assert!(close(m.p0, 0.0449, 1e-4));
    assert!(close(m.lq, 3.5112, 1e-4));
    assert!(close(m.l, m.lq + 2.5, 1e-9));
}

#[test]
fn overloaded_inputs_are_refused_by_every_model() {
    for model in Model::ALL {
        for rho in [1.05, 1.4, 3.0] {
            match solve(&input_for(model, rho, 3)) {
                Err(QueueError::Unstable { rho: got, .. }) => assert!(got >= 1.0),
                other => panic!("{model} ρ={rho}: expected Unstable, got {other:?}"),
            }
        }
    }
}

#[test]
fn saturation_boundary_is_refused() {
    for (model, servers) in [(Model::MM1, 1), (Model::MMs, 3)] {
        let input = AnalyticInput {
            model,
            arrival: per_minute(2.0 * f64::from(servers)),
            service: per_minute(2.0),
            servers,
        };
        assert!(
            matches!(solve(&input), Err(QueueError::Unstable { rho, .. }) if rho == 1.0),
            "{model}"
        );
    }
}

#[test]
fn units_are_normalized_before_solving() {
    let per_hour = solve(&AnalyticInput {
        model: Model::MM1,
        arrival: ProcessSpec::markovian(Quantity::rate(90.0, TimeUnit::Hour)),
        service: ProcessSpec::markovian(Quantity::mean(24.0, TimeUnit::Second)),
        servers: 1,
    })
    .unwrap();
    let per_minute = solve(&AnalyticInput {
        model: Model::MM1,
        arrival: per_minute(1.5),
        service: per_minute(2.5),
        servers: 1,
    })
    .unwrap();

    assert!(close(per_hour.rho, per_minute.rho, 1e-12));
    assert!(close(per_hour.w, per_minute.w, 1e-9));
    assert!(close(per_hour.lq, per_minute.lq, 1e-9));
}

#[test]
fn model_requirements_are_reported_together() {
    let input = AnalyticInput {
        model: Model::MM1,
        arrival: general_mean(1.0, 0.5),
        service: ProcessSpec::Uniform { min: 0.1, max: 0.3 },
        servers: 1,
    };
    let err = solve(&input).unwrap_err();
    let fields: Vec<_> = err.validation_errors().iter().map(|e| e.field).collect();
    assert_eq!(fields, ["arrival", "service"]);
}

#[test]
fn inputs_load_from_json() {
    let text = r#"{
        "model": "G/G/s",
        "arrival": {
            "form": "general",
            "quantity": { "value": 0.5, "kind": "mean" },
            "spread": { "std_dev": 0.4 }
        },
        "service": { "form": "uniform", "min": 0.5, "max": 1.5 },
        "servers": 2
    }"#;
    let input: AnalyticInput = serde_json::from_str(text).unwrap();
    assert_eq!(input.model, Model::GGs);
    assert_eq!(input.arrival.moments().rate, 2.0);

    let m = solve(&input).unwrap();
    assert!(close(m.rho, 0.5, 1e-12));
    assert!(close(m.cs2, (1.0 / 12.0) / 1.0, 1e-12));
    assert!(close(m.ca2, 0.16 * 4.0, 1e-12));
}
