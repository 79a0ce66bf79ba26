// Multiparty BFV with a common reference string: every participant
// contributes to one joint public key, and all of them decrypt together.

mod util;

use std::{env, error::Error, process::exit};

use console::style;
use mhe::{
    bfv::{Ciphertext, Computer, Encoding},
    mbfv::{Aggregate, CommonReferenceString, DecryptionShare, KeyGenRound, PublicKeyShare},
    participant::Participant,
};
use mhe_traits::FheDecoder;
use rand::thread_rng;
use rayon::prelude::*;
use tracing::info;
use util::timeit::timeit;

fn print_notice_and_exit(error: Option<String>) {
    println!(
        "{} Multiparty BFV with a common reference string",
        style("  overview:").magenta().bold()
    );
    println!(
        "{} mhe_crs [-h] [--help] [--num_parties=<value>]",
        style("     usage:").magenta().bold()
    );
    println!(
        "{} {} must be at least 3",
        style("constraints:").magenta().bold(),
        style("num_parties").blue(),
    );
    if let Some(error) = error {
        println!("{} {}", style("     error:").red().bold(), error);
    }
    exit(0);
}

fn main() -> Result<(), Box<dyn Error>> {
    util::init_tracing();

    let args: Vec<String> = env::args().skip(1).collect();
    if args.contains(&"-h".to_string()) || args.contains(&"--help".to_string()) {
        print_notice_and_exit(None)
    }

    let mut num_parties = 40;
    for arg in &args {
        match util::parse_flag(arg, "--num_parties") {
            Some(Ok(value)) => num_parties = value,
            Some(Err(e)) => print_notice_and_exit(Some(e)),
            None => print_notice_and_exit(Some(format!("Unrecognized argument: {arg}"))),
        }
    }
    if num_parties < 3 {
        print_notice_and_exit(Some("At least 3 parties are required".to_string()))
    }

    println!("# Multiparty BFV with a common reference string");
    println!("\tnum_parties = {num_parties}");

    let params = timeit!("Parameters generation", util::demo_parameters()?);

    let parties = timeit!(
        "Secret key generation",
        (0..num_parties)
            .into_par_iter()
            .map(|i| Participant::new(i, &params, &mut thread_rng()))
            .collect::<Result<Vec<_>, _>>()?
    );
    let all = (0..num_parties).collect::<Vec<_>>();

    let pk = timeit!("Public key generation", {
        let crs = CommonReferenceString::new(&mut thread_rng());
        let round = KeyGenRound::new(&params, crs.sample_crp(&params))?;
        let shares = parties
            .par_iter()
            .map(|p| p.public_key_share(&round, &mut thread_rng()))
            .collect::<Result<Vec<_>, _>>()?;
        round.finalize(&PublicKeyShare::from_shares(shares)?, &all)?
    });

    let cts = timeit!(
        "Encryption",
        parties
            .par_iter()
            .map(|p| {
                let input = vec![p.index() as u64; params.degree()];
                p.encrypt(&input, &pk, &mut thread_rng())
            })
            .collect::<Result<Vec<_>, _>>()?
    );

    let ct_add = timeit!("Computation", {
        let mut ct_add = cts[0].clone();
        Computer::new(&params).add(&cts[1], &cts[2], &mut ct_add)?;
        ct_add
    });

    let decrypt = |ct: &Ciphertext| -> Result<Vec<u64>, Box<dyn Error>> {
        let shares = parties
            .par_iter()
            .map(|p| p.decryption_share(ct, &mut thread_rng()))
            .collect::<Result<Vec<_>, _>>()?;
        let pt = DecryptionShare::from_shares(shares)?.finalize(ct, &all, 0)?;
        Ok(Vec::<u64>::try_decode(&pt, Encoding::simd())?)
    };

    timeit!("Decryption", {
        for (j, ct) in cts.iter().enumerate() {
            util::print_slots(&format!("party {j}"), &decrypt(ct)?);
        }
        let sum = decrypt(&ct_add)?;
        util::print_slots("ct_add", &sum);
        info!(expected = 3, got = sum[0], "decrypted the sum of parties 1 and 2");
    });

    Ok(())
}
