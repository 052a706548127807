// End-to-end sessions through the public API.
//
// Each session shares one global table across its lines, the way the REPL does.
#![expect(clippy::unwrap_used)] // test code OK

use minilisp::{Arity, Error, EvalConfig, Value, create_global_env, eval, eval_with_config};

/// Evaluate lines in order and render each outcome the way the REPL prints it.
fn session(lines: &[&str]) -> Vec<String> {
    let mut globals = create_global_env();
    lines
        .iter()
        .map(|line| match eval(line, &mut globals) {
            Ok(Value::Unspecified) => String::new(),
            Ok(value) => value.to_string(),
            Err(err) => format!("error: {err}"),
        })
        .collect()
}

#[test]
fn square_then_call() {
    let out = session(&[
        "(define square (lambda (x) (* x x)))",
        "(square 5)",
        "(square)",
        "square",
    ]);
    assert_eq!(out[0], "");
    assert_eq!(out[1], "25");
    assert_eq!(
        out[2],
        "error: invalid number of arguments: expected 1, got 0"
    );
    assert_eq!(out[3], "#<lambda (x)>");
}

#[test]
fn basic_forms() {
    let out = session(&[
        "(if (> 3 2) 1 0)",
        "(car (quote (1 2 3)))",
        "(cdr (quote (1 2 3)))",
        "((lambda (x y) (+ x y)) 3 4)",
        "foo",
        "(quote (a (b 2)))",
        "(list #t #f nil)",
        "car",
        "(/ 1 4)",
    ]);
    assert_eq!(
        out,
        vec![
            "1",
            "1",
            "(2 3)",
            "7",
            "error: unbound variable: foo",
            "(a (b 2))",
            "(#t #f nil)",
            "#<builtin:car>",
            "0.25",
        ]
    );
}

#[test]
fn errors_do_not_end_the_session() {
    let out = session(&[
        "(define x 10)",
        "(+ x",
        "(car x)",
        "(define x 11)",
        "(+ x 1)",
    ]);
    assert!(out[1].starts_with("error: invalid sub-expression"));
    assert!(out[2].starts_with("error: type error"));
    assert_eq!(out[3], "error: cannot redefine x");
    assert_eq!(out[4], "11");
}

#[test]
fn closures_capture_by_reference() {
    let out = session(&[
        "(define x 1)",
        "(define show (lambda () x))",
        "(set! x 2)",
        "(show)",
    ]);
    assert_eq!(out[3], "2");
}

#[test]
fn counters_keep_private_state() {
    let out = session(&[
        "(define counter (lambda (n) (lambda () (if (set! n (+ n 1)) n n))))",
        "(define c1 (counter 0))",
        "(define c2 (counter 10))",
        "(c1)",
        "(c1)",
        "(c2)",
        "(c1)",
    ]);
    assert_eq!(&out[3..], ["1", "2", "11", "3"]);
}

#[test]
fn higher_order_recursion() {
    let out = session(&[
        "(define map1 (lambda (f l) (if (null? l) (list) (cons (f (car l)) (map1 f (cdr l))))))",
        "(map1 (lambda (n) (* n 10)) (quote (1 2 3)))",
        "(define sum (lambda (l) (if (null? l) 0 (+ (car l) (sum (cdr l))))))",
        "(sum (map1 abs (list -1 -2 -3)))",
    ]);
    assert_eq!(out[1], "(10 20 30)");
    assert_eq!(out[3], "6");
}

#[test]
fn host_functions_and_aliases() {
    fn average(args: &[Value]) -> Result<Value, Error> {
        let mut total = 0.0;
        for arg in args {
            match arg {
                Value::Number(n) => total += n,
                other => return Err(Error::TypeMismatch(format!("average: {other}"))),
            }
        }
        Ok(Value::Number(total / args.len() as f64))
    }

    let mut globals = create_global_env();
    globals
        .register_builtin_function("average", Arity::AtLeast(1), average)
        .unwrap();
    globals.define_alias("mean", "average").unwrap();

    assert_eq!(eval("(average 1 2 3)", &mut globals).unwrap(), Value::Number(2.0));
    assert_eq!(eval("(mean 4 6)", &mut globals).unwrap(), Value::Number(5.0));
    assert!(matches!(
        eval("(average)", &mut globals),
        Err(Error::ArityMismatch { .. })
    ));
    assert_eq!(
        globals.register_builtin_function("average", Arity::Any, average),
        Err(Error::Redefinition("average".into()))
    );

    let names: Vec<String> = globals
        .get_all_bindings()
        .into_iter()
        .map(|(name, _)| name)
        .collect();
    assert!(names.contains(&"average".to_owned()));
    assert!(names.contains(&"mean".to_owned()));
    assert!(names.windows(2).all(|pair| pair[0] <= pair[1]));
}

#[test]
fn runaway_recursion_is_contained() {
    let mut globals = create_global_env();
    eval("(define spin (lambda (n) (spin (+ n 1))))", &mut globals).unwrap();

    let config = EvalConfig { max_depth: 100 };
    let err = eval_with_config("(spin 0)", &mut globals, &config).unwrap_err();
    assert_eq!(err, Error::DepthExceeded(100));
    assert!(!err.is_syntax_error());

    assert_eq!(eval("(+ 2 2)", &mut globals).unwrap(), Value::Number(4.0));
}
