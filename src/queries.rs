use crate::domain::VisMode;

pub const WIKIDATA_ENDPOINT: &str = "https://query.wikidata.org/sparql";

const PREFIXES: &str = "PREFIX wd:  <http://www.wikidata.org/entity/>
PREFIX wdt: <http://www.wikidata.org/prop/direct/>
PREFIX wikibase: <http://wikiba.se/ontology#>
PREFIX bd:  <http://www.bigdata.com/rdf#>
";

pub const GRAPH: &str = "SELECT
  ?disease ?diseaseLabel
  ?goTerm ?goTermLabel
  (COUNT(DISTINCT ?orthologSpecies) AS ?supportingSpecies)
WHERE {
  VALUES ?disease { wd:Q12174 wd:Q11081 wd:Q206901 wd:Q844935 wd:Q187255 wd:Q8277 }
  VALUES ?modelSpecies { wd:Q83310 wd:Q184224 wd:Q169444 wd:Q130506 wd:Q91703 wd:Q27510868 }

  ?humanGene wdt:P703 wd:Q15978631 ;
             wdt:P2293 ?disease ;
             wdt:P684  ?orthologGene ;
             wdt:P688  ?protein .
  ?orthologGene wdt:P703 ?orthologSpecies .
  FILTER(?orthologSpecies IN (?modelSpecies))
  ?protein wdt:P682 ?goTerm .

  SERVICE wikibase:label { bd:serviceParam wikibase:language \"en\". }
}
GROUP BY ?disease ?diseaseLabel ?goTerm ?goTermLabel
ORDER BY ?diseaseLabel ?goTermLabel
";

pub const GROUPED_BAR: &str = "SELECT
  ?orthologSpecies ?orthologSpeciesLabel
  ?disease ?diseaseLabel
  (COUNT(DISTINCT ?goTerm) AS ?goAnnotationCount)
WHERE {
  VALUES ?orthologSpecies { wd:Q83310 wd:Q184224 wd:Q169444 wd:Q130506 wd:Q91703 wd:Q27510868 }
  VALUES ?disease { wd:Q12174 wd:Q11081 wd:Q206901 wd:Q844935 wd:Q187255 wd:Q8277 }

  ?humanGene wdt:P703 wd:Q15978631 ;
             wdt:P2293 ?disease ;
             wdt:P684  ?orthologGene .
  ?orthologGene wdt:P703 ?orthologSpecies .
  ?humanGene wdt:P688 ?protein .
  ?protein wdt:P682 ?goTerm .

  SERVICE wikibase:label { bd:serviceParam wikibase:language \"en\". }
}
GROUP BY ?orthologSpecies ?orthologSpeciesLabel ?disease ?diseaseLabel
ORDER BY ?orthologSpeciesLabel ?diseaseLabel
";

pub const BAR: &str = "SELECT ?species ?speciesLabel (COUNT(DISTINCT ?modelGene) AS ?orthologCount)
WHERE {
  ?humanGene wdt:P703 wd:Q15978631 .
  ?humanGene wdt:P684 ?modelGene .
  ?modelGene wdt:P703 ?species .
  FILTER(?species != wd:Q15978631)
  SERVICE wikibase:label { bd:serviceParam wikibase:language \"en\". }
}
GROUP BY ?species ?speciesLabel
HAVING (COUNT(DISTINCT ?modelGene) > 1000)
ORDER BY DESC(?orthologCount)
";

const DISEASE_TISSUE_BODY: &str = "SELECT
  ?disease ?diseaseLabel
  ?tissue ?tissueLabel
  (COUNT(DISTINCT ?humanGene) AS ?geneCount)
WHERE {
  ?humanGene wdt:P703 wd:Q15978631 ;
             wdt:P594 ?humanEnsembl ;
             wdt:P2293 ?disease ;
             wdt:P684  ?ratGene .
  ?ratGene wdt:P703 wd:Q184224 ;
           wdt:P594 ?ratEnsembl .
  ?disease wdt:P927 ?tissue .
  SERVICE wikibase:label { bd:serviceParam wikibase:language \"en\". }
}
GROUP BY ?disease ?diseaseLabel ?tissue ?tissueLabel
ORDER BY DESC(?geneCount)
";

pub const ORTHOLOG_PAIRS: &str = "SELECT ?humanGene ?humanGeneLabel ?ratGene ?ratGeneLabel ?disease ?diseaseLabel
       (SAMPLE(?humanEnsembl) AS ?humanEnsembl)
       (SAMPLE(?ratEnsembl) AS ?ratEnsembl)
WHERE {
  ?humanGene wdt:P703 wd:Q15978631 ;
             wdt:P594 ?humanEnsembl ;
             wdt:P2293 ?disease ;
             wdt:P684 ?ratGene .
  ?ratGene wdt:P703 wd:Q184224 ;
           wdt:P594 ?ratEnsembl .
  SERVICE wikibase:label { bd:serviceParam wikibase:language \"en\". }
}
GROUP BY ?humanGene ?humanGeneLabel ?ratGene ?ratGeneLabel ?disease ?diseaseLabel
LIMIT 1000
";

pub fn query_for(mode: VisMode) -> String {
    match mode {
        VisMode::Graph => format!("{PREFIXES}{GRAPH}"),
        VisMode::GroupedBar => format!("{PREFIXES}{GROUPED_BAR}"),
        VisMode::Bar => format!("{PREFIXES}{BAR}"),
        VisMode::Bubble => format!("{PREFIXES}{DISEASE_TISSUE_BODY}LIMIT 200\n"),
        VisMode::Heatmap => format!("{PREFIXES}{DISEASE_TISSUE_BODY}LIMIT 400\n"),
    }
}

pub fn ortholog_pairs_query() -> String {
    format!("{PREFIXES}{ORTHOLOG_PAIRS}")
}
