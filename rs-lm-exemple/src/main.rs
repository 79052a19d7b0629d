use rs_lm_core::config::from_env;
use rs_lm_core::{ConfigOptions, LanguageModel};

const SEED: u64 = 42;

const SAMPLE: &str = "\
HAMLET.
To be, or not to be, that is the question: whether 'tis nobler in the mind to suffer
the slings and arrows of outrageous fortune, or to take arms against a sea of troubles,
and by opposing end them. To die, to sleep, no more; and by a sleep to say we end
the heart-ache and the thousand natural shocks that flesh is heir to. [Pause]
'Tis a consummation devoutly to be wished. To die, to sleep. To sleep, perchance to dream!
Ay, there's the rub, for in that sleep of death what dreams may come?";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Set RUST_LOG=debug to follow training and cache activity
    env_logger::init();

    // Configuration comes from RS_LM_* variables, defaults otherwise
    let config = from_env()?;

    // A fixed seed makes every run print the same text
    let mut model = LanguageModel::seeded(config, SEED)?;

    // Train on the file given as first argument, or on the built-in passage
    let text = match std::env::args().nth(1) {
        Some(path) => std::fs::read_to_string(path)?,
        None => SAMPLE.to_owned(),
    };
    let stats = model.train(&text)?;
    println!("{stats}\n");

    // Lower temperatures stick to the most likely tokens, higher ones wander
    for temperature in [0.3, 1.0, 2.0] {
        let result = model.generate("to be", 20, temperature)?;
        println!("[t={temperature}] {}", result.text);
    }
    println!();

    // Every step records why the token was picked and what else was possible
    let result = model.generate("to sleep", 8, 1.0)?;
    println!("{}", result.text);
    for (explanation, options) in result.explanations.iter().zip(&result.options) {
        let alternatives: Vec<String> = options
            .iter()
            .map(|c| format!("{} ({:.2}%)", c.token, c.probability * 100.0))
            .collect();
        println!("  {explanation}\n    {}", alternatives.join(", "));
    }
    println!();

    // Invalid values are rejected, the model stays usable
    match model.generate("to be", 10, 0.0) {
        Ok(_) => println!("Should not happen"),
        Err(e) => println!("Temperature 0.0 is invalid: {e}"),
    }
    match model.configure(&ConfigOptions { alpha: Some(-1.0), ..Default::default() }) {
        Ok(_) => println!("Should not happen"),
        Err(e) => println!("Alpha -1.0 is invalid: {e}"),
    }
    match model.train_bytes(&[0xc3, 0x28]) {
        Ok(_) => println!("Should not happen"),
        Err(e) => println!("Binary input is rejected: {e}"),
    }

    // Stronger smoothing gives unseen tokens more room
    model.configure(&ConfigOptions { alpha: Some(1.0), ..Default::default() })?;
    let result = model.generate("to be", 20, 1.0)?;
    println!("[alpha=1.0] {}", result.text);

    Ok(())
}
