// counties.rs

/// (site slug, display name) for every Ohio county.
/// The slug is the county's sub-domain on the auction site.
pub const OHIO_COUNTIES: &[(&str, &str)] = &[
    ("adams", "Adams"),
    ("allen", "Allen"),
    ("ashland", "Ashland"),
    ("ashtabula", "Ashtabula"),
    ("athens", "Athens"),
    ("auglaize", "Auglaize"),
    ("belmont", "Belmont"),
    ("brown", "Brown"),
    ("butler", "Butler"),
    ("carroll", "Carroll"),
    ("champaign", "Champaign"),
    ("clark", "Clark"),
    ("clermont", "Clermont"),
    ("clinton", "Clinton"),
    ("columbiana", "Columbiana"),
    ("coshocton", "Coshocton"),
    ("crawford", "Crawford"),
    ("cuyahoga", "Cuyahoga"),
    ("darke", "Darke"),
    ("defiance", "Defiance"),
    ("delaware", "Delaware"),
    ("erie", "Erie"),
    ("fairfield", "Fairfield"),
    ("fayette", "Fayette"),
    ("franklin", "Franklin"),
    ("fulton", "Fulton"),
    ("gallia", "Gallia"),
    ("geauga", "Geauga"),
    ("greene", "Greene"),
    ("guernsey", "Guernsey"),
    ("hamilton", "Hamilton"),
    ("hancock", "Hancock"),
    ("hardin", "Hardin"),
    ("harrison", "Harrison"),
    ("henry", "Henry"),
    ("highland", "Highland"),
    ("hocking", "Hocking"),
    ("holmes", "Holmes"),
    ("huron", "Huron"),
    ("jackson", "Jackson"),
    ("jefferson", "Jefferson"),
    ("knox", "Knox"),
    ("lake", "Lake"),
    ("lawrence", "Lawrence"),
    ("licking", "Licking"),
    ("logan", "Logan"),
    ("lorain", "Lorain"),
    ("lucas", "Lucas"),
    ("madison", "Madison"),
    ("mahoning", "Mahoning"),
    ("marion", "Marion"),
    ("medina", "Medina"),
    ("meigs", "Meigs"),
    ("mercer", "Mercer"),
    ("miami", "Miami"),
    ("monroe", "Monroe"),
    ("montgomery", "Montgomery"),
    ("morgan", "Morgan"),
    ("morrow", "Morrow"),
    ("muskingum", "Muskingum"),
    ("noble", "Noble"),
    ("ottawa", "Ottawa"),
    ("paulding", "Paulding"),
    ("perry", "Perry"),
    ("pickaway", "Pickaway"),
    ("pike", "Pike"),
    ("portage", "Portage"),
    ("preble", "Preble"),
    ("putnam", "Putnam"),
    ("richland", "Richland"),
    ("ross", "Ross"),
    ("sandusky", "Sandusky"),
    ("scioto", "Scioto"),
    ("seneca", "Seneca"),
    ("shelby", "Shelby"),
    ("stark", "Stark"),
    ("summit", "Summit"),
    ("trumbull", "Trumbull"),
    ("tuscarawas", "Tuscarawas"),
    ("union", "Union"),
    ("vanwert", "Van Wert"),
    ("vinton", "Vinton"),
    ("warren", "Warren"),
    ("washington", "Washington"),
    ("wayne", "Wayne"),
    ("williams", "Williams"),
    ("wood", "Wood"),
    ("wyandot", "Wyandot"),
];

pub fn display_name(slug: &str) -> Option<&'static str> {
    OHIO_COUNTIES
        .iter()
        .find(|(s, _)| *s == slug)
        .map(|(_, name)| *name)
}

/// Accepts a slug or a display name in any case ("Van Wert" → "vanwert").
pub fn resolve(input: &str) -> Option<&'static str> {
    let wanted: String = input
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_ascii_lowercase();
    OHIO_COUNTIES
        .iter()
        .find(|(slug, _)| *slug == wanted)
        .map(|(slug, _)| *slug)
}

/// Resolves every input to a slug, dropping repeats and keeping first-seen order.
/// Fails with the first input that names no county.
pub fn resolve_all<S: AsRef<str>>(inputs: &[S]) -> Result<Vec<String>, String> {
    let mut slugs: Vec<String> = Vec::with_capacity(inputs.len());
    for input in inputs {
        let input = input.as_ref();
        let slug = resolve(input).ok_or_else(|| input.to_string())?;
        if !slugs.iter().any(|s| s == slug) {
            slugs.push(slug.to_string());
        }
    }
    Ok(slugs)
}
